//! Cached catalog values.

use super::types::{Category, Paginated, Product};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Paginated<Product>),
    Category(Box<Category>),
    Categories(Vec<Category>),
}
