//! Catalog types: products, categories, reviews.

use chrono::{DateTime, Utc};
use papergift_core::{CategoryId, GuestProduct, ProductId, ReviewId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::default_true;

/// A product (greeting card, gift, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    /// Units available. Negative values from the backend are clamped to zero.
    #[serde(default, deserialize_with = "deserialize_stock")]
    pub stock: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Product {
    /// Price the customer pays: the sale price when one is set and lower.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match self.sale_price {
            Some(sale) if sale < self.price => sale,
            _ => self.price,
        }
    }

    /// Whether the product is discounted.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.effective_price() < self.price
    }

    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Primary image: `imageUrl`, else the first gallery image.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }
}

impl From<&Product> for GuestProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.effective_price(),
            image_url: product.primary_image().map(ToString::to_string),
            stock: product.stock,
        }
    }
}

fn deserialize_stock<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_count: Option<u32>,
}

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReview {
    pub id: ReviewId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub user_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /products/{id}/reviews`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json() -> &'static str {
        r#"{
            "id": 12,
            "name": "Birthday Balloon Card",
            "slug": "birthday-balloon-card",
            "price": "4.50",
            "salePrice": 3.99,
            "stock": -2,
            "images": ["https://cdn.example.com/12-a.jpg"],
            "category": {"id": 3, "name": "Birthday"}
        }"#
    }

    #[test]
    fn test_product_deserialize() {
        let product: Product = serde_json::from_str(product_json()).unwrap();
        assert_eq!(product.id, ProductId::new(12));
        assert_eq!(product.price, Decimal::new(450, 2));
        assert_eq!(product.stock, 0);
        assert!(product.is_active);
        assert_eq!(product.category.unwrap().name, "Birthday");
    }

    #[test]
    fn test_effective_price_and_image() {
        let product: Product = serde_json::from_str(product_json()).unwrap();
        assert_eq!(product.effective_price(), Decimal::new(399, 2));
        assert!(product.is_on_sale());
        assert!(!product.in_stock());
        assert_eq!(
            product.primary_image(),
            Some("https://cdn.example.com/12-a.jpg")
        );
    }

    #[test]
    fn test_sale_price_above_price_is_ignored() {
        let mut product: Product = serde_json::from_str(product_json()).unwrap();
        product.sale_price = Some(Decimal::new(999, 2));
        assert_eq!(product.effective_price(), Decimal::new(450, 2));
        assert!(!product.is_on_sale());
    }

    #[test]
    fn test_guest_snapshot() {
        let mut product: Product = serde_json::from_str(product_json()).unwrap();
        product.stock = 8;
        let snapshot = GuestProduct::from(&product);
        assert_eq!(snapshot.id, ProductId::new(12));
        assert_eq!(snapshot.price, Decimal::new(399, 2));
        assert_eq!(snapshot.stock, 8);
    }
}
