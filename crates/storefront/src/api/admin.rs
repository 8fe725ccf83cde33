//! Back-office endpoints (`/admin/*`). Every call requires an admin token.
//!
//! List endpoints take pre-built query pairs (see
//! `components::list_query::ListQuery::to_params`) and return a
//! [`Paginated`] page.

use papergift_core::{
    AccessToken, CouponId, OrderId, OrderStatus, PaymentMethodId, ProductId, PromotionId,
    ReviewId,
};
use reqwest::Method;
use tracing::instrument;

use super::client::NoBody;
use super::types::{
    AdminCart, Coupon, DashboardStats, NewCoupon, NewProduct, NewPromotion, Order,
    OrderStatusUpdate, Paginated, PaymentMethod, PaymentMethodUpdate, Product, ProductReview,
    Promotion, PromotionUpdate,
};
use super::{ApiClient, ApiError};

/// Query pairs for list endpoints.
pub type ListParams = [(&'static str, String)];

impl ApiClient {
    /// Dashboard aggregates (`GET /admin/dashboard`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_dashboard(&self, token: &AccessToken) -> Result<DashboardStats, ApiError> {
        self.get("admin/dashboard", &[], Some(token)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// All products including inactive ones (`GET /admin/products`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_products(
        &self,
        token: &AccessToken,
        params: &ListParams,
    ) -> Result<Paginated<Product>, ApiError> {
        self.get("admin/products", params, Some(token)).await
    }

    /// Create a product (`POST /admin/products`) and drop cached listings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    #[instrument(skip(self, token, product), fields(name = %product.name))]
    pub async fn admin_create_product(
        &self,
        token: &AccessToken,
        product: &NewProduct,
    ) -> Result<Product, ApiError> {
        let created = self
            .send(Method::POST, "admin/products", Some(product), Some(token))
            .await?;
        self.invalidate_catalog().await;
        Ok(created)
    }

    /// Delete a product (`DELETE /admin/products/{id}`) and drop cached
    /// listings.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn admin_delete_product(
        &self,
        token: &AccessToken,
        id: ProductId,
    ) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(
            Method::DELETE,
            &format!("admin/products/{id}"),
            None,
            Some(token),
        )
        .await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    // =========================================================================
    // Orders & carts
    // =========================================================================

    /// All orders (`GET /admin/orders`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_orders(
        &self,
        token: &AccessToken,
        params: &ListParams,
    ) -> Result<Paginated<Order>, ApiError> {
        self.get("admin/orders", params, Some(token)).await
    }

    /// Move an order to a new status (`PATCH /admin/orders/{id}/status`).
    ///
    /// The backend rejects invalid transitions with a 400 and a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is rejected or the request fails.
    #[instrument(skip(self, token), fields(order_id = %id, status = %status.as_str()))]
    pub async fn admin_update_order_status(
        &self,
        token: &AccessToken,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.send(
            Method::PATCH,
            &format!("admin/orders/{id}/status"),
            Some(&OrderStatusUpdate { status }),
            Some(token),
        )
        .await
    }

    /// Live customer carts (`GET /admin/carts`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_carts(
        &self,
        token: &AccessToken,
        params: &ListParams,
    ) -> Result<Paginated<AdminCart>, ApiError> {
        self.get("admin/carts", params, Some(token)).await
    }

    // =========================================================================
    // Coupons & promotions
    // =========================================================================

    /// All coupons (`GET /admin/coupons`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_coupons(
        &self,
        token: &AccessToken,
        params: &ListParams,
    ) -> Result<Paginated<Coupon>, ApiError> {
        self.get("admin/coupons", params, Some(token)).await
    }

    /// Create a coupon (`POST /admin/coupons`).
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails (e.g. duplicate code) or the
    /// request fails.
    #[instrument(skip(self, token, coupon), fields(code = %coupon.code))]
    pub async fn admin_create_coupon(
        &self,
        token: &AccessToken,
        coupon: &NewCoupon,
    ) -> Result<Coupon, ApiError> {
        self.send(Method::POST, "admin/coupons", Some(coupon), Some(token))
            .await
    }

    /// Delete a coupon (`DELETE /admin/coupons/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(coupon_id = %id))]
    pub async fn admin_delete_coupon(
        &self,
        token: &AccessToken,
        id: CouponId,
    ) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(
            Method::DELETE,
            &format!("admin/coupons/{id}"),
            None,
            Some(token),
        )
        .await
    }

    /// All promotions (`GET /admin/promotions`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_promotions(
        &self,
        token: &AccessToken,
        params: &ListParams,
    ) -> Result<Paginated<Promotion>, ApiError> {
        self.get("admin/promotions", params, Some(token)).await
    }

    /// Create a promotion (`POST /admin/promotions`).
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    #[instrument(skip(self, token, promotion), fields(name = %promotion.name))]
    pub async fn admin_create_promotion(
        &self,
        token: &AccessToken,
        promotion: &NewPromotion,
    ) -> Result<Promotion, ApiError> {
        self.send(Method::POST, "admin/promotions", Some(promotion), Some(token))
            .await
    }

    /// Enable or disable a promotion (`PATCH /admin/promotions/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(promotion_id = %id))]
    pub async fn admin_set_promotion_active(
        &self,
        token: &AccessToken,
        id: PromotionId,
        is_active: bool,
    ) -> Result<Promotion, ApiError> {
        self.send(
            Method::PATCH,
            &format!("admin/promotions/{id}"),
            Some(&PromotionUpdate { is_active }),
            Some(token),
        )
        .await
    }

    /// Delete a promotion (`DELETE /admin/promotions/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(promotion_id = %id))]
    pub async fn admin_delete_promotion(
        &self,
        token: &AccessToken,
        id: PromotionId,
    ) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(
            Method::DELETE,
            &format!("admin/promotions/{id}"),
            None,
            Some(token),
        )
        .await
    }

    // =========================================================================
    // Reviews & payment methods
    // =========================================================================

    /// All reviews, approved or pending (`GET /admin/reviews`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_reviews(
        &self,
        token: &AccessToken,
        params: &ListParams,
    ) -> Result<Paginated<ProductReview>, ApiError> {
        self.get("admin/reviews", params, Some(token)).await
    }

    /// Approve a pending review (`PATCH /admin/reviews/{id}/approve`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(review_id = %id))]
    pub async fn admin_approve_review(
        &self,
        token: &AccessToken,
        id: ReviewId,
    ) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(
            Method::PATCH,
            &format!("admin/reviews/{id}/approve"),
            None,
            Some(token),
        )
        .await
    }

    /// Delete a review (`DELETE /admin/reviews/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(review_id = %id))]
    pub async fn admin_delete_review(
        &self,
        token: &AccessToken,
        id: ReviewId,
    ) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(
            Method::DELETE,
            &format!("admin/reviews/{id}"),
            None,
            Some(token),
        )
        .await
    }

    /// Every payment method, active or not (`GET /admin/payment-methods`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_payment_methods(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<PaymentMethod>, ApiError> {
        self.get("admin/payment-methods", &[], Some(token)).await
    }

    /// Enable or disable a payment method
    /// (`PATCH /admin/payment-methods/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(payment_method_id = %id))]
    pub async fn admin_set_payment_method_active(
        &self,
        token: &AccessToken,
        id: PaymentMethodId,
        is_active: bool,
    ) -> Result<PaymentMethod, ApiError> {
        self.send(
            Method::PATCH,
            &format!("admin/payment-methods/{id}"),
            Some(&PaymentMethodUpdate { is_active }),
            Some(token),
        )
        .await
    }
}
