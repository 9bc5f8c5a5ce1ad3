use chrono::{DateTime, Utc};
use serde::{
    de::{self, DeserializeOwned},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value};

mod content;
mod file;

pub use content::{
    Bookmark, Callout, ChildDatabase, ChildPage, Code, Embed, Equation,
    Heading, Icon, RichText, RichTextBlock, ToDo,
};
pub use file::{ExternalFile, FileBlock, FileSource, FileType, NotionFile};

/// Content on the Notion platform.
///
/// `object` is not stored: encoding always writes `"object": "block"` and
/// decoding ignores whatever the payload carried.
/// See: https://developers.notion.com/reference/block
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Block {
    pub id: Option<String>,
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
    pub has_children: Option<bool>,
    pub content: BlockContent,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum BlockContent {
    Paragraph(RichTextBlock),
    Heading1(Heading),
    Heading2(Heading),
    Heading3(Heading),
    BulletedListItem(RichTextBlock),
    NumberedListItem(RichTextBlock),
    ToDo(ToDo),
    Toggle(RichTextBlock),
    ChildPage(ChildPage),
    ChildDatabase(ChildDatabase),
    Callout(Callout),
    Quote(RichTextBlock),
    Code(Code),
    Embed(Embed),
    Image(FileBlock),
    Video(FileBlock),
    File(FileBlock),
    Pdf(FileBlock),
    Bookmark(Bookmark),
    Equation(Equation),
    Unsupported(UnsupportedBlock),
}

/// A block whose `type` this model does not know. The raw type string and
/// payload are kept so the block encodes back unchanged.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct UnsupportedBlock {
    pub block_type: String,
    pub payload: Option<Value>,
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Clone,
    Copy,
    strum::IntoStaticStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlockType {
    Paragraph,
    #[serde(rename = "heading_1")]
    #[strum(serialize = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    #[strum(serialize = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    #[strum(serialize = "heading_3")]
    Heading3,
    BulletedListItem,
    NumberedListItem,
    ToDo,
    Toggle,
    ChildPage,
    ChildDatabase,
    Callout,
    Quote,
    Code,
    Embed,
    Image,
    Video,
    File,
    Pdf,
    Bookmark,
    Equation,
    #[serde(other)]
    Unsupported,
}

impl BlockType {
    /// Unknown strings map to `Unsupported` instead of failing.
    pub fn from_wire(value: &str) -> Self {
        value.parse().unwrap_or(BlockType::Unsupported)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl Block {
    pub const OBJECT: &'static str = "block";

    /// A block ready to be sent in a create request.
    pub fn new(content: BlockContent) -> Self {
        Self {
            id: None,
            created_time: None,
            last_edited_time: None,
            has_children: None,
            content,
        }
    }

    pub fn object(&self) -> &'static str {
        Self::OBJECT
    }

    pub fn block_type(&self) -> BlockType {
        self.content.block_type()
    }

    pub fn children(&self) -> Option<&[Block]> {
        self.content.rich_text_block()?.children.as_deref()
    }

    /// Attaches nested blocks. Returns false when the variant cannot hold
    /// children.
    pub fn set_children(&mut self, children: Vec<Block>) -> bool {
        let Some(content) = self.content.rich_text_block_mut() else {
            return false;
        };
        content.children = Some(children);
        true
    }

    /// Depth-first walk over this block and every nested child, paired with
    /// its depth (this block is 0).
    pub fn walk(&self) -> Vec<(usize, &Block)> {
        let mut blocks = vec![];
        let mut stack = vec![(0, self)];
        while let Some((depth, block)) = stack.pop() {
            blocks.push((depth, block));
            if let Some(children) = block.children() {
                stack.extend(children.iter().rev().map(|c| (depth + 1, c)));
            }
        }
        blocks
    }

    pub fn plain_text(&self) -> String {
        self.content
            .text()
            .iter()
            .flat_map(|t| t.plain_text())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl BlockContent {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Paragraph(_) => BlockType::Paragraph,
            BlockContent::Heading1(_) => BlockType::Heading1,
            BlockContent::Heading2(_) => BlockType::Heading2,
            BlockContent::Heading3(_) => BlockType::Heading3,
            BlockContent::BulletedListItem(_) => BlockType::BulletedListItem,
            BlockContent::NumberedListItem(_) => BlockType::NumberedListItem,
            BlockContent::ToDo(_) => BlockType::ToDo,
            BlockContent::Toggle(_) => BlockType::Toggle,
            BlockContent::ChildPage(_) => BlockType::ChildPage,
            BlockContent::ChildDatabase(_) => BlockType::ChildDatabase,
            BlockContent::Callout(_) => BlockType::Callout,
            BlockContent::Quote(_) => BlockType::Quote,
            BlockContent::Code(_) => BlockType::Code,
            BlockContent::Embed(_) => BlockType::Embed,
            BlockContent::Image(_) => BlockType::Image,
            BlockContent::Video(_) => BlockType::Video,
            BlockContent::File(_) => BlockType::File,
            BlockContent::Pdf(_) => BlockType::Pdf,
            BlockContent::Bookmark(_) => BlockType::Bookmark,
            BlockContent::Equation(_) => BlockType::Equation,
            BlockContent::Unsupported(_) => BlockType::Unsupported,
        }
    }

    /// The `type` string written on the wire. Unsupported blocks keep the
    /// string they were decoded with.
    pub fn wire_type(&self) -> &str {
        match self {
            BlockContent::Unsupported(unsupported) => &unsupported.block_type,
            content => content.block_type().as_str(),
        }
    }

    pub fn text(&self) -> &[RichText] {
        match self {
            BlockContent::Heading1(heading)
            | BlockContent::Heading2(heading)
            | BlockContent::Heading3(heading) => &heading.text,
            content => content
                .rich_text_block()
                .map(|b| b.text.as_slice())
                .unwrap_or_default(),
        }
    }

    fn rich_text_block(&self) -> Option<&RichTextBlock> {
        match self {
            BlockContent::Paragraph(block)
            | BlockContent::BulletedListItem(block)
            | BlockContent::NumberedListItem(block)
            | BlockContent::Toggle(block)
            | BlockContent::Quote(block) => Some(block),
            BlockContent::ToDo(to_do) => Some(&to_do.content),
            BlockContent::Callout(callout) => Some(&callout.content),
            BlockContent::Code(code) => Some(&code.content),
            _ => None,
        }
    }

    fn rich_text_block_mut(&mut self) -> Option<&mut RichTextBlock> {
        match self {
            BlockContent::Paragraph(block)
            | BlockContent::BulletedListItem(block)
            | BlockContent::NumberedListItem(block)
            | BlockContent::Toggle(block)
            | BlockContent::Quote(block) => Some(block),
            BlockContent::ToDo(to_do) => Some(&mut to_do.content),
            BlockContent::Callout(callout) => Some(&mut callout.content),
            BlockContent::Code(code) => Some(&mut code.content),
            _ => None,
        }
    }

    fn serialize_payload<M: SerializeMap>(
        &self,
        map: &mut M,
    ) -> Result<(), M::Error> {
        let key = self.wire_type();
        match self {
            BlockContent::Paragraph(block)
            | BlockContent::BulletedListItem(block)
            | BlockContent::NumberedListItem(block)
            | BlockContent::Toggle(block)
            | BlockContent::Quote(block) => map.serialize_entry(key, block),
            BlockContent::Heading1(heading)
            | BlockContent::Heading2(heading)
            | BlockContent::Heading3(heading) => {
                map.serialize_entry(key, heading)
            }
            BlockContent::ToDo(to_do) => map.serialize_entry(key, to_do),
            BlockContent::ChildPage(page) => map.serialize_entry(key, page),
            BlockContent::ChildDatabase(database) => {
                map.serialize_entry(key, database)
            }
            BlockContent::Callout(callout) => map.serialize_entry(key, callout),
            BlockContent::Code(code) => map.serialize_entry(key, code),
            BlockContent::Embed(embed) => map.serialize_entry(key, embed),
            BlockContent::Image(file)
            | BlockContent::Video(file)
            | BlockContent::File(file)
            | BlockContent::Pdf(file) => map.serialize_entry(key, file),
            BlockContent::Bookmark(bookmark) => {
                map.serialize_entry(key, bookmark)
            }
            BlockContent::Equation(equation) => {
                map.serialize_entry(key, equation)
            }
            BlockContent::Unsupported(UnsupportedBlock {
                payload: Some(payload),
                ..
            }) => map.serialize_entry(key, payload),
            BlockContent::Unsupported(_) => Ok(()),
        }
    }

    fn from_payload(
        block_type: &str,
        payload: Option<Value>,
    ) -> Result<Self, String> {
        let kind = BlockType::from_wire(block_type);
        if kind == BlockType::Unsupported {
            return Ok(BlockContent::Unsupported(UnsupportedBlock {
                block_type: block_type.to_string(),
                payload,
            }));
        }

        let Some(payload) = payload else {
            return Err(format!("missing field `{}`", block_type));
        };

        let content = match kind {
            BlockType::Paragraph => {
                BlockContent::Paragraph(parse(block_type, payload)?)
            }
            BlockType::Heading1 => {
                BlockContent::Heading1(parse(block_type, payload)?)
            }
            BlockType::Heading2 => {
                BlockContent::Heading2(parse(block_type, payload)?)
            }
            BlockType::Heading3 => {
                BlockContent::Heading3(parse(block_type, payload)?)
            }
            BlockType::BulletedListItem => {
                BlockContent::BulletedListItem(parse(block_type, payload)?)
            }
            BlockType::NumberedListItem => {
                BlockContent::NumberedListItem(parse(block_type, payload)?)
            }
            BlockType::ToDo => BlockContent::ToDo(parse(block_type, payload)?),
            BlockType::Toggle => {
                BlockContent::Toggle(parse(block_type, payload)?)
            }
            BlockType::ChildPage => {
                BlockContent::ChildPage(parse(block_type, payload)?)
            }
            BlockType::ChildDatabase => {
                BlockContent::ChildDatabase(parse(block_type, payload)?)
            }
            BlockType::Callout => {
                BlockContent::Callout(parse(block_type, payload)?)
            }
            BlockType::Quote => BlockContent::Quote(parse(block_type, payload)?),
            BlockType::Code => BlockContent::Code(parse(block_type, payload)?),
            BlockType::Embed => BlockContent::Embed(parse(block_type, payload)?),
            BlockType::Image => BlockContent::Image(parse(block_type, payload)?),
            BlockType::Video => BlockContent::Video(parse(block_type, payload)?),
            BlockType::File => BlockContent::File(parse(block_type, payload)?),
            BlockType::Pdf => BlockContent::Pdf(parse(block_type, payload)?),
            BlockType::Bookmark => {
                BlockContent::Bookmark(parse(block_type, payload)?)
            }
            BlockType::Equation => {
                BlockContent::Equation(parse(block_type, payload)?)
            }
            BlockType::Unsupported => {
                BlockContent::Unsupported(UnsupportedBlock {
                    block_type: block_type.to_string(),
                    payload: Some(payload),
                })
            }
        };

        Ok(content)
    }
}

/// Decodes `payload`, prefixing failures with `key` and the path inside the
/// payload. An empty `key` leaves only the inner path.
fn parse<T: DeserializeOwned>(key: &str, payload: Value) -> Result<T, String> {
    serde_path_to_error::deserialize(payload).map_err(|e| {
        let inner = e.path().to_string();
        let path = [key, inner.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty() && *p != ".")
            .collect::<Vec<_>>()
            .join(".");
        if path.is_empty() {
            e.inner().to_string()
        } else {
            format!("{}: {}", path, e.inner())
        }
    })
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("object", Self::OBJECT)?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        map.serialize_entry("type", self.content.wire_type())?;
        if let Some(created_time) = &self.created_time {
            map.serialize_entry("created_time", created_time)?;
        }
        if let Some(last_edited_time) = &self.last_edited_time {
            map.serialize_entry("last_edited_time", last_edited_time)?;
        }
        if let Some(has_children) = &self.has_children {
            map.serialize_entry("has_children", has_children)?;
        }
        self.content.serialize_payload(&mut map)?;
        map.end()
    }
}

/// Wire shape before the payload is picked out by `type`. Every key that
/// is not a common field lands in `payloads`.
#[derive(Deserialize)]
struct RawBlock {
    #[serde(rename = "object")]
    _object: Option<de::IgnoredAny>,
    id: Option<String>,
    #[serde(rename = "type")]
    block_type: String,
    created_time: Option<DateTime<Utc>>,
    last_edited_time: Option<DateTime<Utc>>,
    has_children: Option<bool>,
    #[serde(flatten)]
    payloads: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let mut raw = RawBlock::deserialize(deserializer)?;
        let payload = raw.payloads.remove(&raw.block_type);
        let content = BlockContent::from_payload(&raw.block_type, payload)
            .map_err(de::Error::custom)?;

        Ok(Block {
            id: raw.id,
            created_time: raw.created_time,
            last_edited_time: raw.last_edited_time,
            has_children: raw.has_children,
            content,
        })
    }
}
