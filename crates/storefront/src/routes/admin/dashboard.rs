//! Admin dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{DashboardStats, SeriesPoint};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::{Loader, PageContext, money};
use crate::state::AppState;

/// One bar of the revenue chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    pub value: String,
    /// Bar height relative to the tallest bar, `0..=100`.
    pub percent: u8,
}

/// Scale a series to percentages of its largest value.
fn chart_bars(series: &[SeriesPoint]) -> Vec<ChartBar> {
    let max = series.iter().map(|p| p.value).fold(0.0_f64, f64::max);

    series
        .iter()
        .map(|point| {
            let ratio = if max > 0.0 { point.value.max(0.0) / max } else { 0.0 };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let percent = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
            ChartBar {
                label: point.label.clone(),
                value: format!("${:.2}", point.value),
                percent,
            }
        })
        .collect()
}

/// Status breakdown row.
#[derive(Debug, Clone)]
pub struct StatusRow {
    pub label: &'static str,
    pub count: u64,
    /// Link to the orders table filtered by this status.
    pub href: String,
}

/// Best-seller row.
#[derive(Debug, Clone)]
pub struct TopProductRow {
    pub name: String,
    pub quantity_sold: u64,
    pub revenue: String,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub section: &'static str,
    pub total_revenue: String,
    pub total_orders: u64,
    pub total_customers: u64,
    pub total_products: u64,
    pub pending_orders: u64,
    pub chart: Vec<ChartBar>,
    pub statuses: Vec<StatusRow>,
    pub top_products: Vec<TopProductRow>,
}

impl DashboardTemplate {
    fn new(ctx: PageContext, stats: &DashboardStats) -> Self {
        Self {
            ctx,
            section: "dashboard",
            total_revenue: money(stats.total_revenue),
            total_orders: stats.total_orders,
            total_customers: stats.total_customers,
            total_products: stats.total_products,
            pending_orders: stats.pending_orders,
            chart: chart_bars(&stats.revenue_series),
            statuses: stats
                .orders_by_status
                .iter()
                .map(|row| StatusRow {
                    label: row.status.label(),
                    count: row.count,
                    href: format!("/admin/orders?status={}", row.status.as_str()),
                })
                .collect(),
            top_products: stats
                .top_products
                .iter()
                .map(|p| TopProductRow {
                    name: p.name.clone(),
                    quantity_sold: p.quantity_sold,
                    revenue: money(p.revenue),
                })
                .collect(),
        }
    }
}

/// Display the dashboard. A failed load shows zeros and a toast.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> Result<DashboardTemplate, AppError> {
    let mut loader = Loader::new();
    let stats = loader.load("dashboard statistics", state.api().admin_dashboard(&user.token).await)?;

    let ctx = PageContext::new(&state, &session, Some(&user), "Dashboard", loader.into_toasts()).await;
    Ok(DashboardTemplate::new(ctx, &stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(label: &str, value: f64) -> SeriesPoint {
        SeriesPoint {
            label: label.to_string(),
            value,
        }
    }

    #[test]
    fn test_chart_bars_scale_to_max() {
        let bars = chart_bars(&[point("Mon", 50.0), point("Tue", 200.0), point("Wed", 0.0)]);
        assert_eq!(bars[0].percent, 25);
        assert_eq!(bars[1].percent, 100);
        assert_eq!(bars[2].percent, 0);
        assert_eq!(bars[1].value, "$200.00");
    }

    #[test]
    fn test_chart_bars_all_zero() {
        let bars = chart_bars(&[point("Mon", 0.0)]);
        assert_eq!(bars[0].percent, 0);
        assert!(chart_bars(&[]).is_empty());
    }
}
