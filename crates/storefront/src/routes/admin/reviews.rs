//! Review moderation.
//!
//! Approve/delete run through [`ReviewModeration`], which only changes the
//! listed reviews once the backend confirms. HTMX requests get the table
//! back re-rendered from that state; the table is swapped in place.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use papergift_core::ReviewId;
use tower_sessions::Session;
use tracing::instrument;

use super::date_cell;
use crate::api::{PageMeta, ProductReview};
use crate::components::data_table::reviews_table_config;
use crate::components::{AdminRow, AdminTable, ListQuery, RowAction};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::routes::context::{Loader, PageContext, htmx_fragment, is_htmx, redirect_back};
use crate::services::admin_reviews::ReviewModeration;
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

/// HTMX event raised after a moderation action.
pub const REVIEWS_UPDATED: &str = "reviews-updated";

/// Reviews page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/reviews.html")]
pub struct AdminReviewsTemplate {
    pub ctx: PageContext,
    pub section: &'static str,
    pub table: AdminTable,
    pub pending: usize,
}

/// Reviews table fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "admin/_table.html")]
pub struct ReviewsTableTemplate {
    pub table: AdminTable,
}

fn review_row(review: &ProductReview) -> AdminRow {
    let id = review.id;
    let mut row = AdminRow::new(
        id,
        vec![
            review
                .product_name
                .clone()
                .unwrap_or_else(|| format!("Product #{}", review.product_id)),
            review.user_name.clone(),
            format!("{}/5", review.rating),
            review.comment.clone().unwrap_or_default(),
            if review.is_approved { "Yes" } else { "Pending" }.to_string(),
            date_cell(review.created_at),
        ],
    );

    if !review.is_approved {
        row = row.action(RowAction::new("Approve", format!("/admin/reviews/{id}/approve")));
    }
    row.action(
        RowAction::new("Delete", format!("/admin/reviews/{id}/delete"))
            .destructive(&format!("Delete the review by {}?", review.user_name)),
    )
}

fn reviews_table(query: &ListQuery, reviews: &[ProductReview], meta: &PageMeta) -> AdminTable {
    let rows = reviews.iter().map(review_row).collect();
    AdminTable::new(reviews_table_config(), "/admin/reviews", query, rows, meta)
}

/// Reviews list.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<AdminReviewsTemplate, AppError> {
    let mut loader = Loader::new();
    let reviews = loader.load(
        "reviews",
        state.api().admin_list_reviews(&user.token, &query.to_params()).await,
    )?;
    let moderation = ReviewModeration::new(reviews.data);

    Ok(AdminReviewsTemplate {
        section: "reviews",
        pending: moderation.pending_count(),
        table: reviews_table(&query, moderation.reviews(), &reviews.meta),
        ctx: PageContext::new(&state, &session, Some(&user), "Reviews", loader.into_toasts()).await,
    })
}

#[derive(Debug, Clone, Copy)]
enum Moderation {
    Approve,
    Delete,
}

/// Load the page being moderated, apply the action, and answer with the
/// table (HTMX) or a flash and redirect.
async fn moderate(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    headers: &HeaderMap,
    query: &ListQuery,
    id: ReviewId,
    action: Moderation,
) -> Result<Response, AppError> {
    if !is_htmx(headers) {
        let toast = match action {
            Moderation::Approve => ReviewModeration::default().approve(state.api(), &user.token, id).await,
            Moderation::Delete => ReviewModeration::default().delete(state.api(), &user.token, id).await,
        };
        flash(session, toast).await;
        return Ok(redirect_back(headers, "/admin/reviews").into_response());
    }

    let mut loader = Loader::new();
    let page = loader.load(
        "reviews",
        state.api().admin_list_reviews(&user.token, &query.to_params()).await,
    )?;
    let mut moderation = ReviewModeration::new(page.data);

    let toast = match action {
        Moderation::Approve => moderation.approve(state.api(), &user.token, id).await,
        Moderation::Delete => moderation.delete(state.api(), &user.token, id).await,
    };
    let toast: Toast = loader.into_toasts().into_iter().next().unwrap_or(toast);

    Ok(htmx_fragment(
        &[REVIEWS_UPDATED],
        Some(&toast),
        ReviewsTableTemplate {
            table: reviews_table(query, moderation.reviews(), &page.meta),
        },
    ))
}

/// Approve a review.
#[instrument(skip(state, session, user, headers))]
pub async fn approve(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
    Path(id): Path<ReviewId>,
) -> Result<Response, AppError> {
    moderate(&state, &session, &user, &headers, &query, id, Moderation::Approve).await
}

/// Delete a review.
#[instrument(skip(state, session, user, headers))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
    Path(id): Path<ReviewId>,
) -> Result<Response, AppError> {
    moderate(&state, &session, &user, &headers, &query, id, Moderation::Delete).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_review_row_actions() {
        let reviews: Vec<ProductReview> = serde_json::from_value(json!([
            {"id": 1, "productId": 3, "productName": "Gift Box", "userName": "Bea", "rating": 5, "isApproved": false},
            {"id": 2, "productId": 3, "userName": "Cal", "rating": 2, "isApproved": true}
        ]))
        .unwrap();

        let pending = review_row(&reviews[0]);
        assert_eq!(pending.cells[0], "Gift Box");
        assert_eq!(pending.cells[4], "Pending");
        assert_eq!(pending.actions.len(), 2);
        assert_eq!(pending.actions[0].label, "Approve");

        let approved = review_row(&reviews[1]);
        assert_eq!(approved.cells[0], "Product #3");
        assert_eq!(approved.actions.len(), 1);
        assert!(approved.actions[0].destructive);
    }

    #[test]
    fn test_reviews_table_is_live() {
        let table = reviews_table(&ListQuery::default(), &[], &PageMeta::default());
        assert!(table.config.live);
        assert!(table.rows.is_empty());
    }
}
