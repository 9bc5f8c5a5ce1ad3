use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use serde_with::skip_serializing_none;

use super::{
    file::{ExternalFile, NotionFile},
    parse, Block,
};

/// A rich text span. Its shape belongs to the rich text object of the API
/// and is carried through untouched.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(transparent)]
pub struct RichText(pub Value);

impl RichText {
    pub fn plain_text(&self) -> Option<&str> {
        self.0.get("plain_text").and_then(Value::as_str)
    }
}

/// Text with optional nested blocks. Shared by paragraph, list items,
/// toggle and quote, and flattened into to-do, callout and code.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct RichTextBlock {
    #[serde(default, alias = "rich_text")]
    pub text: Vec<RichText>,
    pub children: Option<Vec<Block>>,
}

impl RichTextBlock {
    pub fn new(text: Vec<RichText>) -> Self {
        Self {
            text,
            children: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct Heading {
    #[serde(default, alias = "rich_text")]
    pub text: Vec<RichText>,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct ToDo {
    #[serde(flatten)]
    pub content: RichTextBlock,
    pub checked: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct ChildPage {
    #[serde(default)]
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct ChildDatabase {
    #[serde(default)]
    pub title: String,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct Callout {
    #[serde(flatten)]
    pub content: RichTextBlock,
    pub icon: Option<Icon>,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct Code {
    #[serde(flatten)]
    pub content: RichTextBlock,
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct Embed {
    #[serde(default)]
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct Bookmark {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichText>,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
pub struct Equation {
    #[serde(default)]
    pub expression: String,
}

/// Page or callout icon. Icon kinds this model does not know are kept as
/// the raw object and encoded back unchanged.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Icon {
    Emoji { emoji: String },
    External { external: ExternalFile },
    File { file: NotionFile },
    Unsupported(Value),
}

impl Icon {
    pub fn icon_type(&self) -> Option<&str> {
        match self {
            Icon::Emoji { .. } => Some("emoji"),
            Icon::External { .. } => Some("external"),
            Icon::File { .. } => Some("file"),
            Icon::Unsupported(raw) => raw.get("type").and_then(Value::as_str),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IconRef<'a> {
    Emoji { emoji: &'a str },
    External { external: &'a ExternalFile },
    File { file: &'a NotionFile },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownIcon {
    Emoji { emoji: String },
    External { external: ExternalFile },
    File { file: NotionFile },
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Icon::Emoji { emoji } => IconRef::Emoji { emoji }.serialize(serializer),
            Icon::External { external } => {
                IconRef::External { external }.serialize(serializer)
            }
            Icon::File { file } => IconRef::File { file }.serialize(serializer),
            Icon::Unsupported(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Icon {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let known = matches!(
            raw.get("type").and_then(Value::as_str),
            Some("emoji" | "external" | "file")
        );
        if !known {
            return Ok(Icon::Unsupported(raw));
        }

        let icon = match parse::<KnownIcon>("", raw).map_err(de::Error::custom)? {
            KnownIcon::Emoji { emoji } => Icon::Emoji { emoji },
            KnownIcon::External { external } => Icon::External { external },
            KnownIcon::File { file } => Icon::File { file },
        };

        Ok(icon)
    }
}
