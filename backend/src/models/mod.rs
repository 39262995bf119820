//! Data models shared across database access and API handlers.

use serde::{Deserialize, Serialize};

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    /// Maximum number of records to return (default: 50, max: 500).
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Number of records to skip (default: 0).
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl PaginationQuery {
    /// Returns a clamped limit value (1..=500).
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 500)
    }

    /// Returns offset, floored at 0.
    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Wrapper for paginated API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// The data items for the current page.
    pub data: Vec<T>,
    /// Number of records returned in this response.
    pub limit: i64,
    /// Number of records skipped.
    pub offset: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, limit: i64, offset: i64) -> Self {
        Self {
            data,
            limit,
            offset,
        }
    }
}

pub mod day_off;
pub mod holiday;
pub mod project;
pub mod request;
pub mod timesheet;
pub mod user;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_query_clamps_out_of_range_values() {
        let query = PaginationQuery {
            limit: 10_000,
            offset: -3,
        };
        assert_eq!(query.limit(), 500);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn pagination_query_defaults() {
        let query = PaginationQuery::default();
        assert_eq!(query.limit(), 50);
        assert_eq!(query.offset(), 0);
    }
}
