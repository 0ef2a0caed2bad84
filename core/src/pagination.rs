//! Pagination metadata from the envelope's `additional_data` block.
//!
//! Two shapes exist depending on the endpoint generation:
//!
//! ```json
//! {"pagination": {"start": 0, "limit": 100, "more_items_in_collection": true, "next_start": 100}}
//! {"start": 0, "limit": 100, "more_items_in_collection": true}
//! ```
//!
//! The shape is detected structurally, by the presence of a `pagination`
//! key, never by endpoint name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Normalized pagination state for a list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub more_items_in_collection: bool,
    #[serde(default)]
    pub next_start: Option<u64>,
}

impl Pagination {
    /// Start offset for the following page, if there is one.
    ///
    /// An offset past `u64::MAX` means there is no addressable next page.
    pub fn next_page_start(&self) -> Option<u64> {
        if !self.more_items_in_collection {
            return None;
        }
        self.next_start.or_else(|| self.start.checked_add(self.limit))
    }
}

const FLAT_KEYS: [&str; 4] = ["start", "limit", "more_items_in_collection", "next_start"];

/// Extract pagination from `additional_data`.
///
/// Returns `Ok(None)` when the block is absent, null, or carries neither
/// shape.
pub fn extract(additional_data: Option<&Value>) -> Result<Option<Pagination>, DecodeError> {
    let Some(Value::Object(map)) = additional_data else {
        return Ok(None);
    };

    if let Some(nested) = map.get("pagination") {
        if nested.is_null() {
            return Ok(None);
        }
        return Pagination::deserialize(nested)
            .map(Some)
            .map_err(|source| DecodeError::Pagination {
                field: "additional_data.pagination",
                source,
            });
    }

    if !FLAT_KEYS.iter().any(|key| map.contains_key(*key)) {
        return Ok(None);
    }
    Pagination::deserialize(&Value::Object(map.clone()))
        .map(Some)
        .map_err(|source| DecodeError::Pagination {
            field: "additional_data",
            source,
        })
}
