//! Content management for markdown-based static pages.
//!
//! This module loads markdown files from `content/pages` at startup, parses
//! frontmatter metadata, and renders markdown to HTML. Pages are served at
//! `/pages/{slug}`, where the slug is the file stem (`about.md` → `about`).
//!
//! ```markdown
//! ---
//! title: Shipping
//! description: Delivery times and costs
//! order: 3
//! ---
//! Cards ship within **two business days**.
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Metadata for static pages (about, faq, shipping, terms, privacy)
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
    /// Position in the footer links; pages without one sort last.
    #[serde(default)]
    pub order: Option<u32>,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// Content store that holds all loaded pages in memory
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load all pages from `content_dir/pages`.
    ///
    /// A missing directory yields an empty store; individual files that fail
    /// to parse are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_page(&path) {
                    Ok(page) => {
                        tracing::info!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Build a store from already-parsed pages.
    #[must_use]
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|page| (page.slug.clone(), page))
                    .collect(),
            ),
        }
    }

    /// Load a single page from a markdown file
    fn load_page(path: &Path) -> Result<Page, ContentError> {
        let source = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?;

        parse_page(slug, &source)
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Pages in footer order (by `order`, then title).
    #[must_use]
    pub fn footer_pages(&self) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.pages.values().collect();
        pages.sort_by(|a, b| {
            a.meta
                .order
                .unwrap_or(u32::MAX)
                .cmp(&b.meta.order.unwrap_or(u32::MAX))
                .then_with(|| a.meta.title.cmp(&b.meta.title))
        });
        pages
    }
}

/// Parse frontmatter and render the markdown body of one page.
///
/// # Errors
///
/// Returns an error if the frontmatter is missing or malformed.
pub fn parse_page(slug: &str, source: &str) -> Result<Page, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(source)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Page {
        slug: slug.to_string(),
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    // Render options
    options.render.r#unsafe = true; // Allow raw HTML in markdown

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SHIPPING: &str = "---\ntitle: Shipping\norder: 3\n---\nCards ship within **two days**.\n\n| Zone | Days |\n|---|---|\n| US | 3 |\n";

    #[test]
    fn test_parse_page_renders_markdown() {
        let page = parse_page("shipping", SHIPPING).unwrap();

        assert_eq!(page.slug, "shipping");
        assert_eq!(page.meta.title, "Shipping");
        assert_eq!(page.meta.order, Some(3));
        assert!(page.content_html.contains("<strong>two days</strong>"));
        assert!(page.content_html.contains("<table>"));
    }

    #[test]
    fn test_missing_frontmatter() {
        assert!(matches!(
            parse_page("about", "Just text"),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_footer_order() {
        let store = ContentStore::from_pages([
            parse_page("terms", "---\ntitle: Terms\n---\nx").unwrap(),
            parse_page("shipping", SHIPPING).unwrap(),
            parse_page("about", "---\ntitle: About\norder: 1\n---\nx").unwrap(),
        ]);

        let slugs: Vec<&str> = store.footer_pages().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["about", "shipping", "terms"]);
        assert!(store.get_page("faq").is_none());
    }

    #[test]
    fn test_bundled_pages_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");
        let store = ContentStore::load(&dir).unwrap();
        for slug in ["about", "faq", "shipping", "terms", "privacy"] {
            assert!(store.get_page(slug).is_some(), "missing page {slug}");
        }
    }
}
