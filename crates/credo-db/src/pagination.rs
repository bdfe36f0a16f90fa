//! Pagination for listing queries

use serde::{Deserialize, Serialize};

/// Page used when the caller does not ask for one
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when the caller does not ask for one
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Pagination parameters as requested by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationRequest {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub per_page: i64,
    #[serde(default)]
    pub disable_pagination: bool,
}

/// Pagination metadata attached to a listing response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl PaginationRequest {
    /// Build an enabled pagination request
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page,
            per_page,
            disable_pagination: false,
        }
    }

    /// Build a request that returns every row
    pub fn disabled() -> Self {
        Self {
            disable_pagination: true,
            ..Default::default()
        }
    }

    /// Fill in the default page and page size
    ///
    /// Disabled pagination is left untouched.
    pub fn with_defaults(mut self) -> Self {
        if self.disable_pagination {
            return self;
        }
        if self.page < 1 {
            self.page = DEFAULT_PAGE;
        }
        if self.per_page < 1 {
            self.per_page = DEFAULT_PER_PAGE;
        }
        self
    }

    /// Number of rows to skip, saturating for pages past the end of `i64`
    pub fn offset(&self) -> i64 {
        if self.page <= 1 {
            return 0;
        }
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Maximum number of rows to return
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Metadata for a response, `None` when pagination is disabled
    pub fn meta(&self, total: i64) -> Option<PaginationMeta> {
        if self.disable_pagination {
            return None;
        }
        Some(PaginationMeta {
            total,
            page: self.page,
            per_page: self.per_page,
        })
    }
}
