//! Admin back office.
//!
//! Every handler here takes [`RequireAdmin`](crate::middleware::RequireAdmin):
//! guests are sent to login, customers get 403. List pages share
//! [`AdminTable`](crate::components::AdminTable) and the
//! `admin/_table.html` partial; actions are plain `POST` forms that flash
//! their outcome and return to the list.

pub mod carts;
pub mod coupons;
pub mod dashboard;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod promotions;
pub mod reviews;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use papergift_core::DiscountType;
use rust_decimal::Decimal;

use super::context::money;
use crate::state::AppState;

/// Admin routes, nested under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::show))
        .route("/products", get(products::index).post(products::create))
        .route("/products/{id}/delete", post(products::delete))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/carts", get(carts::index))
        .route("/coupons", get(coupons::index).post(coupons::create))
        .route("/coupons/{id}/delete", post(coupons::delete))
        .route("/promotions", get(promotions::index).post(promotions::create))
        .route("/promotions/{id}/toggle", post(promotions::toggle))
        .route("/promotions/{id}/delete", post(promotions::delete))
        .route("/reviews", get(reviews::index))
        .route("/reviews/{id}/approve", post(reviews::approve))
        .route("/reviews/{id}/delete", post(reviews::delete))
        .route("/payment-methods", get(payment_methods::index))
        .route("/payment-methods/{id}/toggle", post(payment_methods::toggle))
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

/// `10%` or `$5.00`.
fn discount_label(kind: DiscountType, value: Decimal) -> String {
    match kind {
        DiscountType::Percentage => format!("{}%", value.normalize()),
        DiscountType::FixedAmount => money(value),
    }
}

/// Date cell, or a dash for none.
fn date_cell(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "—".to_string(), |v| v.format("%Y-%m-%d").to_string())
}

/// Parse a money or percentage field. Blank is `None`.
fn parse_amount(field: &str, value: &str) -> Result<Option<Decimal>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<Decimal>() {
        Ok(amount) if amount.is_sign_negative() => Err(format!("{field} cannot be negative.")),
        Ok(amount) => Ok(Some(amount)),
        Err(_) => Err(format!("{field} must be a number.")),
    }
}

/// Parse a `datetime-local` or `date` input as UTC. Blank is `None`.
fn parse_datetime(field: &str, value: &str) -> Result<Option<DateTime<Utc>>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(23, 59, 59).unwrap_or_default())
        })
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| format!("{field} is not a valid date."))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_label() {
        assert_eq!(discount_label(DiscountType::Percentage, Decimal::new(1000, 2)), "10%");
        assert_eq!(discount_label(DiscountType::FixedAmount, Decimal::new(5, 0)), "$5.00");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("Price", " "), Ok(None));
        assert_eq!(parse_amount("Price", "4.50"), Ok(Some(Decimal::new(450, 2))));
        assert!(parse_amount("Price", "-1").is_err());
        assert!(parse_amount("Price", "abc").is_err());
    }

    #[test]
    fn test_parse_datetime() {
        let parsed = parse_datetime("Ends", "2026-12-24T18:30").unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-12-24T18:30:00+00:00");

        let end_of_day = parse_datetime("Ends", "2026-12-24").unwrap().unwrap();
        assert_eq!(end_of_day.to_rfc3339(), "2026-12-24T23:59:59+00:00");

        assert_eq!(parse_datetime("Ends", ""), Ok(None));
        assert!(parse_datetime("Ends", "tomorrow").is_err());
    }
}
