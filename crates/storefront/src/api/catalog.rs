//! Catalog reads: products and categories (cached).

use papergift_core::{CategoryId, ProductId};
use tracing::{debug, instrument};

use super::cache::CacheValue;
use super::types::{Category, Paginated, Product};
use super::{ApiClient, ApiError};

/// Filters for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Backend sort key, e.g. `price_asc`, `newest`.
    pub sort: Option<String>,
}

impl ProductQuery {
    /// Query string pairs for the backend; unset filters are omitted.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(("categoryId", category_id.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }

    fn is_search(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    fn cache_key(&self) -> String {
        format!(
            "products:{}:{}:{}:{}",
            self.page.unwrap_or(1),
            self.limit.unwrap_or_default(),
            self.category_id.map(|id| id.to_string()).unwrap_or_default(),
            self.sort.as_deref().unwrap_or_default(),
        )
    }
}

impl ApiClient {
    /// List products (`GET /products`).
    ///
    /// Unfiltered and category listings are cached; search results are not.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Paginated<Product>, ApiError> {
        let cache_key = query.cache_key();

        if !query.is_search()
            && let Some(CacheValue::Products(products)) = self.cache().get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Paginated<Product> = self.get("products", &query.to_pairs(), None).await?;

        if !query.is_search() {
            self.cache()
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// Fetch a single product (`GET /products/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown products, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        self.fetch_product(id, cache_key).await
    }

    /// Fetch a single product from the backend, skipping the cache.
    ///
    /// Used where stock must be current, such as the guest cart's stock cap.
    /// The fresh copy replaces the cached one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown products, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_uncached(&self, id: ProductId) -> Result<Product, ApiError> {
        self.fetch_product(id, format!("product:{id}")).await
    }

    async fn fetch_product(&self, id: ProductId, cache_key: String) -> Result<Product, ApiError> {
        let product: Product = self.get(&format!("products/{id}"), &[], None).await?;
        self.cache()
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List all categories (`GET /categories`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get("categories", &[], None).await?;
        self.cache()
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Fetch a single category (`GET /categories/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown categories, or an error if
    /// the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ApiError> {
        let cache_key = format!("category:{id}");

        if let Some(CacheValue::Category(category)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let category: Category = self.get(&format!("categories/{id}"), &[], None).await?;
        self.cache()
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::{Path, Query};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::api::testing::spawn_backend;

    #[test]
    fn test_query_pairs_skip_unset_filters() {
        let query = ProductQuery {
            page: Some(2),
            category_id: Some(CategoryId::new(3)),
            ..ProductQuery::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![("page", "2".to_string()), ("categoryId", "3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_get_product_is_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let router = Router::new().route(
            "/products/{id}",
            get(move |Path(id): Path<i64>| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"id": id, "name": "Anniversary Card", "price": 5}))
                }
            }),
        );
        let api = spawn_backend(router).await;

        let first = api.get_product(ProductId::new(9)).await.unwrap();
        let second = api.get_product(ProductId::new(9)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.name, "Anniversary Card");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_uncached_read_sees_current_stock() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let router = Router::new().route(
            "/products/{id}",
            get(move |Path(id): Path<i64>| {
                let counter = Arc::clone(&counter);
                async move {
                    // Each read sells one more unit.
                    let sold = counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"id": id, "name": "Gift Tag", "price": 1, "stock": 5 - sold}))
                }
            }),
        );
        let api = spawn_backend(router).await;

        assert_eq!(api.get_product(ProductId::new(4)).await.unwrap().stock, 5);
        assert_eq!(api.get_product(ProductId::new(4)).await.unwrap().stock, 5);
        assert_eq!(api.get_product_uncached(ProductId::new(4)).await.unwrap().stock, 4);
        // The fresh copy replaced the cached one.
        assert_eq!(api.get_product(ProductId::new(4)).await.unwrap().stock, 4);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_search_results_bypass_cache() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let router = Router::new().route(
            "/products",
            get(
                move |Query(params): Query<std::collections::HashMap<String, String>>| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(params.get("search").map(String::as_str), Some("thanks"));
                        Json(json!({"data": [], "meta": {"total": 0, "page": 1, "limit": 20, "totalPages": 0}}))
                    }
                },
            ),
        );
        let api = spawn_backend(router).await;
        let query = ProductQuery {
            search: Some("thanks".to_string()),
            ..ProductQuery::default()
        };

        api.list_products(&query).await.unwrap();
        api.list_products(&query).await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let api = spawn_backend(Router::new()).await;
        let err = api.get_product(ProductId::new(404)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
