//! Query-string state for paginated lists.
//!
//! Admin tables and the product listing read `?page=&limit=&search=&status=&sort=&direction=`
//! from the URL, clamp it, forward it to the backend and render prev/next
//! links that keep the active filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::api::PageMeta;

/// Rows per page when the query does not say.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page size the backend is asked for.
pub const MAX_LIMIT: u32 = 100;

/// Deserialize empty or unparsable values as `None`.
///
/// Browsers submit empty inputs as `key=`, and a hand-edited `page=abc`
/// should fall back to the default rather than reject the request.
pub(crate) fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok()))
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// List query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub direction: Option<SortDirection>,
}

impl ListQuery {
    /// Current page, never below 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn direction(&self) -> SortDirection {
        self.direction.unwrap_or_default()
    }

    /// Backend query parameters (`page`, `limit`, `search`, `status`, `sort`, `order`).
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page().to_string()),
            ("limit", self.limit().to_string()),
        ];
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(status) = &self.status {
            params.push(("status", status.clone()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.clone()));
            params.push(("order", self.direction().as_str().to_string()));
        }
        params
    }

    /// Filters carried into pagination and sort links (everything but `page`).
    fn link_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.clamp(1, MAX_LIMIT).to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
            pairs.push(("direction", self.direction().as_str().to_string()));
        }
        pairs
    }

    /// Link that sorts by `column`, flipping the direction when the list is
    /// already sorted by it. Returns to page 1.
    #[must_use]
    pub fn sort_url(&self, base_path: &str, column: &str) -> String {
        let direction = if self.sort.as_deref() == Some(column) {
            self.direction().reversed()
        } else {
            SortDirection::Asc
        };
        let next = Self {
            page: None,
            sort: Some(column.to_string()),
            direction: Some(direction),
            ..self.clone()
        };
        build_url(base_path, &next.link_pairs())
    }

    /// Query string (with leading `?`) reproducing this page, or empty.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut pairs = self.link_pairs();
        if self.page() > 1 {
            pairs.push(("page", self.page().to_string()));
        }
        build_url("", &pairs)
    }

    /// Pagination view for the page the backend returned.
    #[must_use]
    pub fn pagination(&self, base_path: &str, meta: &PageMeta) -> Pagination {
        Pagination::new(base_path, meta, &self.link_pairs())
    }
}

/// Prev/next navigation for one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pagination {
    /// Build links for `meta`, carrying `filters` on every link.
    #[must_use]
    pub fn new(base_path: &str, meta: &PageMeta, filters: &[(&'static str, String)]) -> Self {
        let total_pages = meta.total_pages.max(1);
        let page = meta.page.clamp(1, total_pages);

        let link = |target: u32| {
            let mut pairs = filters.to_vec();
            if target > 1 {
                pairs.push(("page", target.to_string()));
            }
            build_url(base_path, &pairs)
        };

        Self {
            page,
            total_pages,
            total: meta.total,
            prev_url: (page > 1).then(|| link(page - 1)),
            next_url: (page < total_pages).then(|| link(page + 1)),
        }
    }

    /// Whether there is more than one page to navigate.
    #[must_use]
    pub fn is_paged(&self) -> bool {
        self.total_pages > 1
    }
}

fn build_url(base_path: &str, pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return base_path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{base_path}?{query}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Query;
    use axum::http::Uri;

    use super::*;

    fn parse(query: &str) -> ListQuery {
        let uri: Uri = format!("/admin/orders?{query}").parse().unwrap();
        Query::<ListQuery>::try_from_uri(&uri).unwrap().0
    }

    fn meta(page: u32, total_pages: u32) -> PageMeta {
        PageMeta {
            total: u64::from(total_pages) * 20,
            page,
            limit: 20,
            total_pages,
        }
    }

    #[test]
    fn test_defaults_and_clamping() {
        let q = parse("");
        assert_eq!((q.page(), q.limit()), (1, DEFAULT_LIMIT));

        let q = parse("page=0&limit=500");
        assert_eq!((q.page(), q.limit()), (1, MAX_LIMIT));

        let q = parse("limit=0");
        assert_eq!(q.limit(), 1);
    }

    #[test]
    fn test_blank_and_invalid_values_ignored() {
        let q = parse("page=abc&search=&status=%20&direction=sideways");
        assert_eq!(q, ListQuery::default());
    }

    #[test]
    fn test_to_params() {
        let q = parse("page=2&search=birthday&sort=createdAt&direction=desc");
        assert_eq!(
            q.to_params(),
            vec![
                ("page", "2".to_string()),
                ("limit", "20".to_string()),
                ("search", "birthday".to_string()),
                ("sort", "createdAt".to_string()),
                ("order", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_pagination_preserves_filters() {
        let q = parse("page=2&status=PENDING&search=gift%20box");
        let pagination = q.pagination("/admin/orders", &meta(2, 3));

        assert_eq!(
            pagination.prev_url.as_deref(),
            Some("/admin/orders?search=gift+box&status=PENDING")
        );
        assert_eq!(
            pagination.next_url.as_deref(),
            Some("/admin/orders?search=gift+box&status=PENDING&page=3")
        );
    }

    #[test]
    fn test_pagination_edges() {
        let q = ListQuery::default();

        let first = q.pagination("/products", &meta(1, 1));
        assert!(first.prev_url.is_none());
        assert!(first.next_url.is_none());
        assert!(!first.is_paged());

        let empty = q.pagination("/products", &meta(1, 0));
        assert_eq!(empty.total_pages, 1);
    }

    #[test]
    fn test_sort_url_toggles() {
        let q = parse("sort=total&direction=asc&page=4");
        assert_eq!(
            q.sort_url("/admin/orders", "total"),
            "/admin/orders?sort=total&direction=desc"
        );
        assert_eq!(
            q.sort_url("/admin/orders", "createdAt"),
            "/admin/orders?sort=createdAt&direction=asc"
        );
    }

    #[test]
    fn test_query_string_reproduces_page() {
        assert_eq!(parse("").query_string(), "");
        assert_eq!(
            parse("status=pending&page=3").query_string(),
            "?status=pending&page=3"
        );
    }
}
