//! Server-side cart and wishlist types.

use chrono::{DateTime, Utc};
use papergift_core::{CartId, CartItemId, ProductId, WishlistItemId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;

/// The authenticated customer's cart (`GET /cart`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartResponse {
    pub id: Option<CartId>,
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub total_items: u32,
}

impl CartResponse {
    /// Sum of quantities; falls back to counting lines when the backend
    /// omits `totalItems`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        if self.total_items > 0 {
            self.total_items
        } else {
            self.items.iter().fold(0u32, |total, item| total.saturating_add(item.quantity))
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One line of the server-side cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product: Product,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub line_total: Decimal,
}

/// Body of `POST /cart/items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /cart/merge`: the guest cart staged for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCartRequest {
    pub items: Vec<AddCartItem>,
}

/// The authenticated customer's wishlist (`GET /wishlist`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wishlist {
    pub items: Vec<WishlistItem>,
}

impl Wishlist {
    /// Whether the product is in the wishlist.
    #[must_use]
    pub fn has_item(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

/// One wishlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product: Product,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

/// Body of `POST /wishlist/merge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeWishlistRequest {
    pub product_ids: Vec<ProductId>,
}
