use chrono::{DateTime, Utc};
use serde::{
    de, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value};

use super::{content::RichText, parse};

/// Payload of image, video, file and pdf blocks.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct FileBlock {
    #[serde(flatten)]
    pub source: FileSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichText>,
}

impl FileBlock {
    pub fn external(url: impl Into<String>) -> Self {
        Self {
            source: FileSource::External {
                external: ExternalFile { url: url.into() },
            },
            caption: vec![],
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.source.url()
    }
}

/// Where the bytes live. Exactly one reference exists, keyed by `type`.
/// Kinds this model does not know keep their `type` string and the object
/// stored under it.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum FileSource {
    File {
        file: NotionFile,
    },
    External {
        external: ExternalFile,
    },
    Unsupported {
        file_type: String,
        payload: Option<Value>,
    },
}

impl FileSource {
    pub fn file_type(&self) -> FileType {
        match self {
            FileSource::File { .. } => FileType::File,
            FileSource::External { .. } => FileType::External,
            FileSource::Unsupported { .. } => FileType::Unsupported,
        }
    }

    /// The `type` string written on the wire.
    pub fn wire_type(&self) -> &str {
        match self {
            FileSource::Unsupported { file_type, .. } => file_type,
            source => source.file_type().as_str(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            FileSource::File { file } => Some(&file.url),
            FileSource::External { external } => Some(&external.url),
            FileSource::Unsupported { payload, .. } => payload
                .as_ref()
                .and_then(|p| p.get("url"))
                .and_then(Value::as_str),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FileSourceRef<'a> {
    File { file: &'a NotionFile },
    External { external: &'a ExternalFile },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownFileSource {
    File { file: NotionFile },
    External { external: ExternalFile },
}

impl Serialize for FileSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FileSource::File { file } => {
                FileSourceRef::File { file }.serialize(serializer)
            }
            FileSource::External { external } => {
                FileSourceRef::External { external }.serialize(serializer)
            }
            FileSource::Unsupported { file_type, payload } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", file_type)?;
                if let Some(payload) = payload {
                    map.serialize_entry(file_type, payload)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for FileSource {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let file_type = match fields.remove("type") {
            Some(Value::String(file_type)) => file_type,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "type: invalid type: {}, expected a string",
                    other
                )))
            }
            None => return Err(de::Error::missing_field("type")),
        };

        if FileType::from_wire(&file_type) == FileType::Unsupported {
            let payload = fields.remove(&file_type);
            return Ok(FileSource::Unsupported { file_type, payload });
        }

        fields.insert("type".to_string(), Value::String(file_type));
        let source = match parse::<KnownFileSource>("", Value::Object(fields))
            .map_err(de::Error::custom)?
        {
            KnownFileSource::File { file } => FileSource::File { file },
            KnownFileSource::External { external } => {
                FileSource::External { external }
            }
        };

        Ok(source)
    }
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    Eq,
    PartialEq,
    Clone,
    Copy,
    strum::IntoStaticStr,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FileType {
    File,
    External,
    #[serde(other)]
    Unsupported,
}

impl FileType {
    /// Unknown strings map to `Unsupported` instead of failing.
    pub fn from_wire(value: &str) -> Self {
        value.parse().unwrap_or(FileType::Unsupported)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A file hosted by Notion. The url stops working after `expiry_time`.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct NotionFile {
    pub url: String,
    pub expiry_time: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct ExternalFile {
    pub url: String,
}
