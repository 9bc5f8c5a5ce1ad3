use response::IntoResponse;
use serde::de::DeserializeOwned;
use tracing::debug;

mod block;
mod pagination;
mod response;

pub use block::{
    Block, BlockContent, BlockType, Bookmark, Callout, ChildDatabase,
    ChildPage, Code, Embed, Equation, ExternalFile, FileBlock, FileSource,
    FileType, Heading, Icon, NotionFile, RichText, RichTextBlock, ToDo,
    UnsupportedBlock,
};
pub use pagination::{BlockChildrenResponse, PaginationQuery, MAX_PAGE_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("{} at {}: {}", message, path, source)]
    Decode {
        message: String,
        path: String,
        source: serde_json::Error,
    },

    #[error("{}: {}", message, source)]
    Encode {
        message: String,
        source: serde_json::Error,
    },
}

type Response<T> = Result<T, BlockError>;

fn decode<T: DeserializeOwned>(json: &str, message: &str) -> Response<T> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let value =
        serde_path_to_error::deserialize(&mut deserializer).into_response(message)?;
    deserializer.end().map_err(|e| BlockError::Decode {
        message: message.to_string(),
        path: "<root>".to_string(),
        source: e,
    })?;

    Ok(value)
}

/// Decodes a single block object.
pub fn decode_block(json: &str) -> Response<Block> {
    let block: Block = decode(json, "failed to decode block")?;
    debug!(task = "decode block", block_type = %block.block_type());

    Ok(block)
}

/// Decodes the body returned when listing a block's children.
pub fn decode_children(json: &str) -> Response<BlockChildrenResponse> {
    let response: BlockChildrenResponse =
        decode(json, "failed to decode block children")?;
    debug!(
        task = "decode block children",
        results = response.results.len(),
        has_more = response.has_more,
    );

    Ok(response)
}

pub fn encode_block(block: &Block) -> Response<String> {
    serde_json::to_string(block).into_response("failed to encode block")
}

pub fn encode_children(response: &BlockChildrenResponse) -> Response<String> {
    serde_json::to_string(response)
        .into_response("failed to encode block children")
}

pub fn encode_children_pretty(
    response: &BlockChildrenResponse,
) -> Response<String> {
    serde_json::to_string_pretty(response)
        .into_response("failed to encode block children")
}

#[cfg(test)]
mod test {
    use std::{fs, path::Path};

    use serde_json::{json, Value};

    use super::*;

    fn fixture(name: &str) -> String {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(name);
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_decode_children() {
        // Arrange
        let text = fixture("test.json");

        // Act
        let response = decode_children(&text);

        // Assert
        let response = response.unwrap();
        let types = response
            .results
            .iter()
            .map(Block::block_type)
            .collect::<Vec<_>>();
        assert_eq!(
            types,
            vec![
                BlockType::Heading2,
                BlockType::Paragraph,
                BlockType::Code,
                BlockType::Image,
                BlockType::Bookmark,
                BlockType::Unsupported,
            ]
        );
        assert!(response.has_more);
        assert_eq!(
            response.next_query(Some(100)),
            Some(
                PaginationQuery::new()
                    .with_start_cursor("e6c6f8ff-c70e-4970-91ba-98f03e0d7fc6")
                    .with_page_size(100)
            )
        );
    }

    #[test]
    fn test_encode_children_overrides_object() {
        // Arrange
        let text = fixture("test.json");
        let response = decode_children(&text).unwrap();

        // Act
        let encoded = encode_children(&response).unwrap();

        // Assert
        let encoded = serde_json::from_str::<Value>(&encoded).unwrap();
        let objects = encoded["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["object"].clone())
            .collect::<Vec<_>>();
        assert!(objects.iter().all(|o| *o == json!("block")));
        assert_eq!(decode_children(&encoded.to_string()).unwrap(), response);
    }

    #[test]
    fn test_encode_block_roundtrip() {
        let block = Block::new(BlockContent::Equation(Equation {
            expression: "a^2 + b^2 = c^2".to_string(),
        }));

        let encoded = encode_block(&block).unwrap();

        assert_eq!(
            encoded,
            r#"{"object":"block","type":"equation","equation":{"expression":"a^2 + b^2 = c^2"}}"#
        );
        assert_eq!(decode_block(&encoded).unwrap(), block);
    }

    #[test]
    fn test_decode_error_has_path() {
        // Arrange
        let text = json!({
            "results": [
                { "type": "paragraph", "paragraph": { "text": [] } },
                { "type": "paragraph", "paragraph": { "text": 5 } },
            ],
            "has_more": false,
            "next_cursor": null,
        })
        .to_string();

        // Act
        let result = decode_children(&text);

        // Assert
        let Err(BlockError::Decode { path, source, .. }) = result else {
            panic!("expected decode error, got {:?}", result);
        };
        assert!(path.starts_with("results[1]"), "{}", path);
        assert!(source.to_string().contains("paragraph.text"));
    }

    #[test]
    fn test_unknown_nested_kinds_do_not_fail_the_page() {
        // Arrange
        let text = json!({
            "results": [
                {
                    "object": "block",
                    "type": "callout",
                    "callout": {
                        "text": [],
                        "icon": { "type": "custom_emoji", "custom_emoji": { "id": "1" } },
                    },
                },
                {
                    "object": "block",
                    "type": "video",
                    "video": { "type": "file_upload", "file_upload": { "id": "2" } },
                },
                { "object": "block", "type": "equation", "equation": { "expression": "x" } },
            ],
            "has_more": false,
            "next_cursor": null,
        })
        .to_string();

        // Act
        let response = decode_children(&text);

        // Assert
        let response = response.unwrap();
        let types = response
            .results
            .iter()
            .map(Block::block_type)
            .collect::<Vec<_>>();
        assert_eq!(
            types,
            vec![BlockType::Callout, BlockType::Video, BlockType::Equation]
        );
        let encoded = encode_children(&response).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&encoded).unwrap(),
            serde_json::from_str::<Value>(&text).unwrap()
        );
    }

    #[test]
    fn test_decode_malformed_json() {
        let result = decode_block(r#"{"object":"block","type":"#);

        assert!(matches!(result, Err(BlockError::Decode { .. })));
    }

    #[test]
    fn test_decode_trailing_characters() {
        let result = decode_block(
            r#"{"type":"embed","embed":{"url":"https://example.com"}} x"#,
        );

        let Err(BlockError::Decode { path, .. }) = result else {
            panic!("expected decode error, got {:?}", result);
        };
        assert_eq!(path, "<root>");
    }

    #[test]
    fn test_has_children_type_mismatch_is_an_error() {
        let result = decode_block(
            r#"{"type":"embed","has_children":"yes","embed":{"url":""}}"#,
        );

        assert!(result.is_err());
    }
}
