use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::block::Block;

/// Largest `page_size` the API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for one page of a paginated listing.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub struct PaginationQuery {
    pub start_cursor: Option<String>,
    pub page_size: Option<u32>,
}

impl PaginationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_cursor(mut self, start_cursor: impl Into<String>) -> Self {
        self.start_cursor = Some(start_cursor.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Pairs for the request's query string. Unset values are left out and
    /// `page_size` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![];

        if let Some(start_cursor) = &self.start_cursor {
            if !start_cursor.is_empty() {
                pairs.push(("start_cursor", start_cursor.clone()));
            }
        }

        if let Some(page_size) = self.page_size {
            let clamped = page_size.clamp(1, MAX_PAGE_SIZE);
            if clamped != page_size {
                warn!(
                    task = "clamp page size",
                    requested = page_size,
                    page_size = clamped,
                );
            }
            pairs.push(("page_size", clamped.to_string()));
        }

        pairs
    }
}

/// Body of `GET /v1/blocks/{block_id}/children`.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct BlockChildrenResponse {
    #[serde(default)]
    pub results: Vec<Block>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

impl BlockChildrenResponse {
    /// The query that fetches the following page, or `None` on the last one.
    pub fn next_query(&self, page_size: Option<u32>) -> Option<PaginationQuery> {
        if !self.has_more {
            return None;
        }

        let next_cursor = self
            .next_cursor
            .as_deref()
            .filter(|cursor| !cursor.is_empty())?;

        Some(PaginationQuery {
            start_cursor: Some(next_cursor.to_string()),
            page_size,
        })
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_last_page() {
        // Arrange
        let json = json!({ "results": [], "has_more": false, "next_cursor": null });

        // Act
        let response =
            serde_json::from_value::<BlockChildrenResponse>(json).unwrap();

        // Assert
        assert!(response.results.is_empty());
        assert!(!response.has_more);
        assert_eq!(response.next_cursor, None);
        assert_eq!(response.next_query(Some(50)), None);
    }

    #[test]
    fn test_next_cursor_is_encoded_as_null() {
        let response = BlockChildrenResponse {
            results: vec![],
            has_more: false,
            next_cursor: None,
        };

        let encoded = serde_json::to_value(&response).unwrap();

        assert_eq!(
            encoded,
            json!({ "results": [], "has_more": false, "next_cursor": null })
        );
    }

    #[test]
    fn test_next_query_follows_cursor() {
        let response = BlockChildrenResponse {
            results: vec![],
            has_more: true,
            next_cursor: Some("fe2cc560-036c-44cd-90e8-294d5a74cebc".to_string()),
        };

        let query = response.next_query(Some(25)).unwrap();

        assert_eq!(
            query,
            PaginationQuery::new()
                .with_start_cursor("fe2cc560-036c-44cd-90e8-294d5a74cebc")
                .with_page_size(25)
        );
    }

    #[test]
    fn test_next_query_stops_without_cursor() {
        let response = BlockChildrenResponse {
            results: vec![],
            has_more: true,
            next_cursor: None,
        };

        assert_eq!(response.next_query(None), None);
    }

    #[test]
    fn test_query_pairs() {
        assert!(PaginationQuery::new().query_pairs().is_empty());
        assert!(PaginationQuery::new()
            .with_start_cursor("")
            .query_pairs()
            .is_empty());

        let pairs = PaginationQuery::new()
            .with_start_cursor("abc")
            .with_page_size(10)
            .query_pairs();
        assert_eq!(
            pairs,
            vec![("start_cursor", "abc".to_string()), ("page_size", "10".to_string())]
        );
    }

    #[test]
    fn test_query_pairs_clamp_page_size() {
        let too_large = PaginationQuery::new().with_page_size(500).query_pairs();
        let zero = PaginationQuery::new().with_page_size(0).query_pairs();

        assert_eq!(too_large, vec![("page_size", "100".to_string())]);
        assert_eq!(zero, vec![("page_size", "1".to_string())]);
    }
}
