//! Cart and wishlist state for visitors who are not logged in.
//!
//! The storefront persists these values in the visitor's session between
//! page loads. Items are keyed by product; each item carries a snapshot of the
//! product (name, price, image, stock) taken when it was last added, so the
//! cart page can render without asking the backend again.
//!
//! After login the contents are handed to the backend for merging and then
//! cleared. The merge rule itself belongs to the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Errors from guest cart operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuestError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The resulting quantity would exceed the product's known stock.
    #[error("only {available} of \"{name}\" in stock (requested {requested})")]
    InsufficientStock {
        /// Product display name.
        name: String,
        /// Quantity the cart would have held.
        requested: u32,
        /// Stock recorded for the product.
        available: u32,
    },
}

/// Snapshot of a product as shown in the guest cart or wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestProduct {
    /// Backend product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price at the time of the snapshot (sale price when discounted).
    pub price: Decimal,
    /// Primary image URL.
    pub image_url: Option<String>,
    /// Stock known at the time of the snapshot.
    pub stock: u32,
}

/// One line of the guest cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCartItem {
    /// Product snapshot.
    pub product: GuestProduct,
    /// Quantity, always between 1 and `product.stock`.
    pub quantity: u32,
}

impl GuestCartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The guest cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCart {
    #[serde(default)]
    items: Vec<GuestCartItem>,
}

impl GuestCart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add `quantity` of a product, or increment the existing line.
    ///
    /// The stored stock snapshot is refreshed from `product`.
    ///
    /// # Errors
    ///
    /// Returns [`GuestError::InvalidQuantity`] for a zero quantity and
    /// [`GuestError::InsufficientStock`] when the resulting quantity would
    /// exceed `product.stock`. The cart is unchanged on error.
    pub fn add_item(&mut self, product: GuestProduct, quantity: u32) -> Result<u32, GuestError> {
        if quantity == 0 {
            return Err(GuestError::InvalidQuantity);
        }

        let current = self
            .items
            .iter()
            .find(|item| item.product.id == product.id)
            .map_or(0, |item| item.quantity);

        let requested = current.saturating_add(quantity);
        if requested > product.stock {
            return Err(GuestError::InsufficientStock {
                name: product.name,
                requested,
                available: product.stock,
            });
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            existing.quantity = requested;
            existing.product = product;
        } else {
            self.items.push(GuestCartItem {
                product,
                quantity: requested,
            });
        }

        Ok(requested)
    }

    /// Set the quantity of a line. Zero removes the line.
    ///
    /// Returns `false` if the product is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`GuestError::InsufficientStock`] if `quantity` exceeds the
    /// recorded stock. The cart is unchanged on error.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<bool, GuestError> {
        if quantity == 0 {
            return Ok(self.remove_item(product_id));
        }

        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product_id)
        else {
            return Ok(false);
        };

        if quantity > item.product.stock {
            return Err(GuestError::InsufficientStock {
                name: item.product.name.clone(),
                requested: quantity,
                available: item.product.stock,
            });
        }

        item.quantity = quantity;
        Ok(true)
    }

    /// Remove a product. Returns whether anything was removed.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|item| item.product.id != product_id);
        self.items.len() < len_before
    }

    /// Whether the product is in the cart.
    #[must_use]
    pub fn has_item(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product.id == product_id)
    }

    /// Quantity held for a product (zero if absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product.id == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[GuestCartItem] {
        &self.items
    }

    /// Sum of quantities, for the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().fold(0u32, |total, item| total.saturating_add(item.quantity))
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals at snapshot prices.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(GuestCartItem::line_total).sum()
    }

    /// `(product, quantity)` pairs staged for the backend merge.
    #[must_use]
    pub fn merge_lines(&self) -> Vec<(ProductId, u32)> {
        self.items
            .iter()
            .map(|item| (item.product.id, item.quantity))
            .collect()
    }
}

/// The guest wishlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestWishlist {
    #[serde(default)]
    items: Vec<GuestProduct>,
}

impl GuestWishlist {
    /// Create an empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a product. Adding a product twice keeps one entry with the newer
    /// snapshot. Returns `true` if the product was not already present.
    pub fn add(&mut self, product: GuestProduct) -> bool {
        if let Some(existing) = self.items.iter_mut().find(|p| p.id == product.id) {
            *existing = product;
            false
        } else {
            self.items.push(product);
            true
        }
    }

    /// Remove a product. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|p| p.id != product_id);
        self.items.len() < len_before
    }

    /// Whether the product is in the wishlist.
    #[must_use]
    pub fn has_item(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|p| p.id == product_id)
    }

    /// Empty the wishlist.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Products in insertion order.
    #[must_use]
    pub fn items(&self) -> &[GuestProduct] {
        &self.items
    }

    /// Number of products, for the wishlist badge.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Product IDs staged for the backend merge.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|p| p.id).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn card(id: i64, stock: u32) -> GuestProduct {
        GuestProduct {
            id: ProductId::new(id),
            name: format!("Card {id}"),
            price: Decimal::new(450, 2),
            image_url: None,
            stock,
        }
    }

    #[test]
    fn test_add_item_increments_existing_line() {
        let mut cart = GuestCart::new();
        assert_eq!(cart.add_item(card(1, 10), 2), Ok(2));
        assert_eq!(cart.add_item(card(1, 10), 3), Ok(5));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.subtotal(), Decimal::new(2250, 2));
    }

    #[test]
    fn test_add_item_never_exceeds_stock() {
        let mut cart = GuestCart::new();
        cart.add_item(card(1, 3), 2).unwrap();

        let err = cart.add_item(card(1, 3), 2).unwrap_err();
        assert_eq!(
            err,
            GuestError::InsufficientStock {
                name: "Card 1".to_string(),
                requested: 4,
                available: 3,
            }
        );
        // Unchanged on failure
        assert_eq!(cart.quantity_of(ProductId::new(1)), 2);

        assert_eq!(cart.add_item(card(1, 3), 1), Ok(3));
        assert!(cart.add_item(card(1, 3), 1).is_err());
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_item_rejects_out_of_stock_new_line() {
        let mut cart = GuestCart::new();
        assert!(cart.add_item(card(9, 0), 1).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_item_refreshes_stock_snapshot() {
        let mut cart = GuestCart::new();
        cart.add_item(card(1, 10), 5).unwrap();
        // Stock dropped since the first add
        assert!(cart.add_item(card(1, 5), 1).is_err());
        assert_eq!(cart.add_item(card(1, 6), 1), Ok(6));
        assert_eq!(cart.items()[0].product.stock, 6);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut cart = GuestCart::new();
        assert_eq!(cart.add_item(card(1, 5), 0), Err(GuestError::InvalidQuantity));
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = GuestCart::new();
        cart.add_item(card(1, 5), 1).unwrap();

        assert_eq!(cart.update_quantity(ProductId::new(1), 4), Ok(true));
        assert_eq!(cart.quantity_of(ProductId::new(1)), 4);

        assert!(cart.update_quantity(ProductId::new(1), 6).is_err());
        assert_eq!(cart.quantity_of(ProductId::new(1)), 4);

        assert_eq!(cart.update_quantity(ProductId::new(2), 1), Ok(false));

        assert_eq!(cart.update_quantity(ProductId::new(1), 0), Ok(true));
        assert!(!cart.has_item(ProductId::new(1)));
    }

    #[test]
    fn test_clear_resets_counts() {
        let mut cart = GuestCart::new();
        cart.add_item(card(1, 5), 2).unwrap();
        cart.add_item(card(2, 5), 1).unwrap();
        assert_eq!(cart.item_count(), 3);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_item_count_saturates() {
        let mut cart = GuestCart::new();
        cart.add_item(card(1, u32::MAX), u32::MAX).unwrap();
        cart.add_item(card(2, u32::MAX), 5).unwrap();
        assert_eq!(cart.item_count(), u32::MAX);
    }

    #[test]
    fn test_merge_lines() {
        let mut cart = GuestCart::new();
        cart.add_item(card(3, 5), 2).unwrap();
        cart.add_item(card(1, 5), 1).unwrap();
        assert_eq!(
            cart.merge_lines(),
            vec![(ProductId::new(3), 2), (ProductId::new(1), 1)]
        );
    }

    #[test]
    fn test_wishlist_membership() {
        let mut wishlist = GuestWishlist::new();
        assert!(wishlist.add(card(1, 0)));
        assert!(!wishlist.add(card(1, 2)));
        assert_eq!(wishlist.len(), 1);
        assert!(wishlist.has_item(ProductId::new(1)));
        assert!(!wishlist.has_item(ProductId::new(2)));

        assert!(wishlist.remove(ProductId::new(1)));
        assert!(!wishlist.remove(ProductId::new(1)));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_session_roundtrip_tolerates_missing_fields() {
        let cart: GuestCart = serde_json::from_str("{}").unwrap();
        assert!(cart.is_empty());
    }
}
