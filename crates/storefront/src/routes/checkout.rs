//! Checkout and payment route handlers.
//!
//! Checkout requires login; guests are sent to `/auth/login?next=/checkout`
//! by the [`RequireAuth`] extractor and their cart is merged on the way back.
//!
//! After the order is placed the payment page loads and immediately issues
//! `POST /checkout/payment/{id}/process` through HTMX. That request waits for
//! the simulated gateway and swaps in the success or failure fragment; the
//! failure fragment carries a retry button re-issuing the same request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use papergift_core::{AddressId, OrderId, PaymentMethodId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::{CART_UPDATED, CartView};
use super::context::{Loader, PageContext, htmx_fragment, is_htmx, money};
use super::orders::OrderView;
use crate::api::{PaymentMethod, PlaceOrderRequest, PromotionPreview, UserAddress, ValidateCouponRequest};
use crate::components::list_query::empty_string_as_none;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::payment::{DEFAULT_FAILURE_MESSAGE, PaymentOutcome};
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Address choice for the checkout form.
#[derive(Debug, Clone)]
pub struct AddressOption {
    pub id: AddressId,
    pub label: String,
    pub is_default: bool,
}

impl From<&UserAddress> for AddressOption {
    fn from(address: &UserAddress) -> Self {
        Self {
            id: address.id,
            label: address.one_line(),
            is_default: address.is_default,
        }
    }
}

/// Payment method choice for the checkout form.
#[derive(Debug, Clone)]
pub struct PaymentOption {
    pub id: PaymentMethodId,
    pub name: String,
    pub description: String,
}

impl From<&PaymentMethod> for PaymentOption {
    fn from(method: &PaymentMethod) -> Self {
        Self {
            id: method.id,
            name: method.name.clone(),
            description: method.description.clone().unwrap_or_default(),
        }
    }
}

/// Promotion estimate shown above the order button.
#[derive(Debug, Clone, Default)]
pub struct PromotionSummary {
    /// `(name, discount)` per applied promotion.
    pub lines: Vec<(String, String)>,
    pub total_discount: Option<String>,
    pub estimated_total: Option<String>,
}

impl From<&PromotionPreview> for PromotionSummary {
    fn from(preview: &PromotionPreview) -> Self {
        Self {
            lines: preview
                .promotions
                .iter()
                .map(|p| (p.name.clone(), money(p.discount)))
                .collect(),
            total_discount: (!preview.total_discount.is_zero())
                .then(|| money(preview.total_discount)),
            estimated_total: (!preview.total.is_zero()).then(|| money(preview.total)),
        }
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
    pub addresses: Vec<AddressOption>,
    pub payment_methods: Vec<PaymentOption>,
    pub promotions: PromotionSummary,
}

impl CheckoutTemplate {
    /// Whether the order can be submitted.
    #[must_use]
    pub fn can_place_order(&self) -> bool {
        !self.cart.is_empty() && !self.addresses.is_empty() && !self.payment_methods.is_empty()
    }
}

/// Display the checkout page.
///
/// Cart, addresses, payment methods and the promotion preview load
/// concurrently; each failure becomes a toast and leaves its section empty.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<CheckoutTemplate, AppError> {
    let api = state.api();
    let (cart, addresses, methods, preview) = tokio::join!(
        api.get_cart(&user.token),
        api.list_addresses(&user.token),
        api.list_payment_methods(&user.token),
        api.promotion_preview(&user.token),
    );

    let mut loader = Loader::new();
    let cart = loader.load("cart", cart)?;
    let addresses = loader.load("addresses", addresses)?;
    let methods = loader.load("payment methods", methods)?;
    let preview = loader.load("promotions", preview)?;

    Ok(CheckoutTemplate {
        cart: CartView::from(&cart),
        addresses: addresses.iter().map(AddressOption::from).collect(),
        payment_methods: methods
            .iter()
            .filter(|m| m.is_active)
            .map(PaymentOption::from)
            .collect(),
        promotions: PromotionSummary::from(&preview),
        ctx: PageContext::new(&state, &session, Some(&user), "Checkout", loader.into_toasts())
            .await,
    })
}

/// Coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub coupon_code: String,
}

/// Coupon result fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/coupon_result.html")]
pub struct CouponResultTemplate {
    pub valid: bool,
    pub code: String,
    pub message: String,
    pub discount: Option<String>,
}

impl CouponResultTemplate {
    fn rejected(code: String, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            code,
            message: message.into(),
            discount: None,
        }
    }
}

/// Validate a coupon against the current cart.
///
/// The backend's message is shown verbatim whether it came as
/// `valid: false` or as a 4xx error.
#[instrument(skip(state, user, form))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CouponForm>,
) -> Result<CouponResultTemplate, AppError> {
    let code = form.coupon_code.trim().to_uppercase();
    if code.is_empty() {
        return Ok(CouponResultTemplate::rejected(code, "Enter a coupon code."));
    }

    let subtotal = match state.api().get_cart(&user.token).await {
        Ok(cart) => cart.subtotal,
        Err(e) if e.is_unauthorized() => return Err(AppError::SessionExpired),
        Err(e) => return Ok(CouponResultTemplate::rejected(code, e.user_message())),
    };

    let request = ValidateCouponRequest {
        code: code.clone(),
        subtotal,
    };
    let result = match state.api().validate_coupon(&user.token, &request).await {
        Ok(validation) if validation.valid => CouponResultTemplate {
            valid: true,
            message: validation
                .message
                .unwrap_or_else(|| "Coupon applied.".to_string()),
            discount: Some(money(validation.discount)),
            code: if validation.code.is_empty() {
                code
            } else {
                validation.code
            },
        },
        Ok(validation) => CouponResultTemplate::rejected(
            code,
            validation
                .message
                .unwrap_or_else(|| "This coupon cannot be used.".to_string()),
        ),
        Err(e) if e.is_unauthorized() => return Err(AppError::SessionExpired),
        Err(e) => CouponResultTemplate::rejected(code, e.user_message()),
    };

    Ok(result)
}

/// Place order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address_id: Option<AddressId>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub payment_method_id: Option<PaymentMethodId>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub coupon_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub note: Option<String>,
}

/// Place the order and continue to payment.
#[instrument(skip(state, session, user, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Redirect, AppError> {
    let (Some(address_id), Some(payment_method_id)) = (form.address_id, form.payment_method_id)
    else {
        flash(
            &session,
            Toast::error("Choose a shipping address and a payment method."),
        )
        .await;
        return Ok(Redirect::to("/checkout"));
    };

    let request = PlaceOrderRequest {
        address_id,
        payment_method_id,
        coupon_code: form.coupon_code.map(|c| c.trim().to_uppercase()),
        note: form.note,
    };

    match state.api().place_order(&user.token, &request).await {
        Ok(order) => {
            tracing::info!(order_id = %order.id, total = %order.total, "Order placed");
            add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order_id", &order.id.to_string())]),
            );
            Ok(Redirect::to(&format!("/checkout/payment/{}", order.id)))
        }
        Err(e) if e.is_unauthorized() => Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Order placement failed");
            flash(&session, Toast::from_api_error(&e)).await;
            Ok(Redirect::to("/checkout"))
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Payment processing page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub ctx: PageContext,
    pub order: OrderView,
}

/// Display the payment processing page for an order.
#[instrument(skip(state, session, user), fields(order_id = %id))]
pub async fn payment(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Response, AppError> {
    let order = state.api().get_order(&user.token, id).await?;
    let view = OrderView::from(&order);
    let ctx = PageContext::new(&state, &session, Some(&user), "Payment", Vec::new()).await;

    // The order emptied the cart; let the header badge refresh.
    Ok(htmx_fragment(
        &[CART_UPDATED],
        None,
        PaymentTemplate { ctx, order: view },
    ))
}

/// Payment result fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/payment_result.html")]
pub struct PaymentResultTemplate {
    pub order_id: OrderId,
    pub reference: String,
    pub success: bool,
    pub message: String,
    pub transaction_id: Option<String>,
}

impl PaymentResultTemplate {
    fn new(order_id: OrderId, reference: String, outcome: PaymentOutcome) -> Self {
        match outcome {
            PaymentOutcome::Success { transaction_id } => Self {
                order_id,
                reference,
                success: true,
                message: "Payment received. Thank you for your order!".to_string(),
                transaction_id,
            },
            PaymentOutcome::Failed { reason } => Self {
                order_id,
                reference,
                success: false,
                message: reason,
                transaction_id: None,
            },
        }
    }
}

/// Process payment for an order.
///
/// HTMX gets the result fragment; a plain POST is redirected to the order
/// list with the outcome flashed.
#[instrument(skip(state, session, user, headers), fields(order_id = %id))]
pub async fn process_payment(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
) -> Result<Response, AppError> {
    let result = match state.api().get_order(&user.token, id).await {
        Ok(order) => {
            let outcome = state.payments().process(&user.token, &order).await;
            PaymentResultTemplate::new(order.id, order.reference(), outcome)
        }
        Err(e) if e.is_unauthorized() => return Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load order for payment");
            PaymentResultTemplate::new(
                id,
                format!("#{id}"),
                PaymentOutcome::Failed {
                    reason: e
                        .backend_message()
                        .map_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string(), ToString::to_string),
                },
            )
        }
    };

    if is_htmx(&headers) {
        return Ok(result.into_response());
    }

    let toast = if result.success {
        Toast::success(result.message)
    } else {
        Toast::error(result.message)
    };
    flash(&session, toast).await;
    Ok(Redirect::to(&format!("/orders?orderId={id}")).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_promotion_summary() {
        let preview: PromotionPreview = serde_json::from_value(json!({
            "promotions": [{"promotionId": 1, "name": "Spring sale", "discount": "1.50"}],
            "totalDiscount": "1.50",
            "subtotal": "15.00",
            "total": "13.50"
        }))
        .unwrap();

        let summary = PromotionSummary::from(&preview);
        assert_eq!(summary.lines, vec![("Spring sale".to_string(), "$1.50".to_string())]);
        assert_eq!(summary.total_discount.as_deref(), Some("$1.50"));
        assert_eq!(summary.estimated_total.as_deref(), Some("$13.50"));

        let empty = PromotionSummary::from(&PromotionPreview::default());
        assert!(empty.total_discount.is_none());
    }

    #[test]
    fn test_payment_result_messages() {
        let ok = PaymentResultTemplate::new(
            OrderId::new(4),
            "PG-0004".to_string(),
            PaymentOutcome::Success {
                transaction_id: Some("tx-4".to_string()),
            },
        );
        assert!(ok.success);
        assert_eq!(ok.transaction_id.as_deref(), Some("tx-4"));

        let failed = PaymentResultTemplate::new(
            OrderId::new(4),
            "PG-0004".to_string(),
            PaymentOutcome::Failed {
                reason: "Card declined".to_string(),
            },
        );
        assert!(!failed.success);
        assert_eq!(failed.message, "Card declined");
    }
}
