//! Offset pagination for list operations.

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_LIMIT: u64 = 50;
/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// A validated `limit`/`offset` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Build a page from optional request parameters.
    ///
    /// A limit of 0 or above [`MAX_PAGE_LIMIT`] is rejected rather than
    /// clamped.
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Result<Self, ValidationError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(ValidationError::InvalidPage(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}, got {limit}"
            )));
        }
        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: Page,
}
