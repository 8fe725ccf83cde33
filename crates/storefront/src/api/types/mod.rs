//! Backend API response and request types.
//!
//! These mirror the backend's JSON records. They carry no invariants beyond
//! their shape; the backend enforces stock, pricing and status rules.

mod account;
mod admin;
mod cart;
mod catalog;
mod marketing;
mod order;

pub use account::*;
pub use admin::*;
pub use cart::*;
pub use catalog::*;
pub use marketing::*;
pub use order::*;

use serde::{Deserialize, Serialize};

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total number of records across all pages.
    #[serde(default)]
    pub total: u64,
    /// Current page (1-based).
    #[serde(default = "first_page")]
    pub page: u32,
    /// Page size.
    #[serde(default)]
    pub limit: u32,
    /// Number of pages.
    #[serde(default)]
    pub total_pages: u32,
}

const fn first_page() -> u32 {
    1
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            total: 0,
            page: 1,
            limit: 0,
            total_pages: 0,
        }
    }
}

/// A page of records: `{ "data": [...], "meta": {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Records on this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Pagination metadata.
    #[serde(default)]
    pub meta: PageMeta,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            meta: PageMeta::default(),
        }
    }
}

impl<T> Paginated<T> {
    /// Whether the page holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub(crate) const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_defaults_when_meta_missing() {
        let page: Paginated<u32> = serde_json::from_str(r#"{"data":[1,2,3]}"#).unwrap();
        assert_eq!(page.data, vec![1, 2, 3]);
        assert_eq!(page.meta.page, 1);
        assert_eq!(page.meta.total_pages, 0);
    }

    #[test]
    fn test_page_meta_camel_case() {
        let meta: PageMeta =
            serde_json::from_str(r#"{"total":41,"page":2,"limit":20,"totalPages":3}"#).unwrap();
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.total, 41);
    }
}
