//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                             - Home page
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (database + backend)
//! GET  /pages/{slug}                 - Static content page
//!
//! # Catalog
//! GET  /products                     - Product listing (?page, search, category, sort)
//! GET  /products/{id}                - Product detail
//! POST /products/{id}/reviews        - Submit a review (login required)
//! GET  /categories                   - Category listing
//! GET  /categories/{id}              - Category detail
//!
//! # Cart & wishlist (guest: session, logged in: backend)
//! GET  /cart                         - Cart page
//! POST /cart/add                     - Add item (HTMX: count badge)
//! POST /cart/update                  - Set quantity (HTMX: cart_items fragment)
//! POST /cart/remove                  - Remove item (HTMX: cart_items fragment)
//! POST /cart/clear                   - Empty the cart
//! GET  /cart/count                   - Count badge fragment
//! GET  /wishlist                     - Wishlist page
//! POST /wishlist/add                 - Save product (HTMX: count badge)
//! POST /wishlist/remove              - Remove product (HTMX: wishlist_items fragment)
//! GET  /wishlist/count               - Count badge fragment
//!
//! # Checkout (login required)
//! GET  /checkout                     - Checkout page
//! POST /checkout                     - Place order
//! POST /checkout/coupon              - Validate coupon (HTMX fragment)
//! GET  /checkout/payment/{order_id}  - Payment processing page
//! POST /checkout/payment/{order_id}/process - Run payment (HTMX fragment)
//!
//! # Customer area (login required)
//! GET  /orders                       - Order history (?orderId highlights)
//! GET  /account                      - Profile and addresses
//! POST /account/profile              - Update profile
//! POST /account/addresses            - Add address
//! POST /account/addresses/{id}/delete - Delete address
//! GET  /notifications                - Inbox
//! POST /notifications/{id}/read      - Mark read and follow link
//! POST /notifications/read-all       - Mark all read
//! GET  /notifications/unread-count   - Unread badge fragment
//!
//! # Auth (rate limited in `build_app`)
//! GET  /auth/login                   - Login page
//! POST /auth/login                   - Login action
//! GET  /auth/register                - Register page
//! POST /auth/register                - Register action
//! POST /auth/logout                  - Logout action
//!
//! # Admin (role ADMIN)
//! /admin/...                         - See `admin::routes`
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod context;
pub mod health;
pub mod home;
pub mod notifications;
pub mod orders;
pub mod pages;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(products::create_review))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/count", get(wishlist::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place_order))
        .route("/coupon", post(checkout::apply_coupon))
        .route("/payment/{order_id}", get(checkout::payment))
        .route("/payment/{order_id}/process", post(checkout::process_payment))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route("/addresses", post(account::create_address))
        .route("/addresses/{id}/delete", post(account::delete_address))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::index))
        .route("/{id}/read", post(notifications::open))
        .route("/read-all", post(notifications::read_all))
        .route("/unread-count", get(notifications::unread_count))
}

/// Create all routes for the storefront except `/auth`, which `build_app`
/// nests behind the rate limiter.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/pages/{slug}", get(pages::show))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/checkout", checkout_routes())
        .route("/orders", get(orders::index))
        .nest("/account", account_routes())
        .nest("/notifications", notification_routes())
        .nest("/admin", admin::routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::routing::{get, patch};
    use axum::{Json, middleware};
    use papergift_core::{AccessToken, UserId, UserRole};
    use serde_json::json;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};

    use super::*;
    use crate::api::ApiClient;
    use crate::api::testing::{spawn_backend, unreachable_backend};
    use crate::config::StorefrontConfig;
    use crate::content::ContentStore;
    use crate::db::create_lazy_pool;
    use crate::middleware::{create_session_layer, session_expiry_middleware, set_current_user};
    use crate::models::CurrentUser;

    fn test_state(api: ApiClient) -> AppState {
        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_DATABASE_URL" => Some("postgres://localhost/papergift_test".to_string()),
            "STOREFRONT_BASE_URL" => Some("http://localhost:3000".to_string()),
            "BACKEND_API_URL" => Some("http://127.0.0.1:9/api".to_string()),
            _ => None,
        })
        .unwrap();
        let pool = create_lazy_pool(&config.database_url).unwrap();
        AppState::with_api(config, pool, ContentStore::from_pages([]), api)
    }

    /// Storefront routes plus a helper that logs the session in as `role`.
    fn test_app(api: ApiClient) -> Router {
        let state = test_state(api);
        let session_layer = create_session_layer(MemoryStore::default(), state.config());

        Router::new()
            .merge(routes())
            .nest("/auth", auth_routes())
            .route(
                "/test/login/{role}",
                get(|session: Session, Path(role): Path<String>| async move {
                    let user = CurrentUser {
                        id: UserId::new(1),
                        name: "Ana".to_string(),
                        email: "ana@example.com".to_string(),
                        role: role.parse::<UserRole>().unwrap(),
                        token: AccessToken::new("token-1"),
                    };
                    set_current_user(&session, &user).await.unwrap();
                    "ok"
                }),
            )
            .layer(middleware::from_fn(session_expiry_middleware))
            .layer(session_layer)
            .with_state(state)
    }

    fn session_cookie(response: &Response) -> String {
        response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    async fn login_as(app: &Router, role: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/test/login/{role}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        session_cookie(&response)
    }

    fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(unreachable_backend());
        let response = app.oneshot(get_with_cookie("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_guest_redirected_from_customer_and_admin_pages() {
        let app = test_app(unreachable_backend());

        for (uri, next) in [
            ("/orders", "%2Forders"),
            ("/account", "%2Faccount"),
            ("/checkout", "%2Fcheckout"),
            ("/admin/orders?status=PENDING", "%2Fadmin%2Forders%3Fstatus%3DPENDING"),
        ] {
            let response = app.clone().oneshot(get_with_cookie(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(
                response.headers()[header::LOCATION],
                format!("/auth/login?next={next}").as_str()
            );
        }
    }

    #[tokio::test]
    async fn test_customer_forbidden_on_admin_pages() {
        let app = test_app(unreachable_backend());
        let cookie = login_as(&app, "CUSTOMER").await;

        for uri in ["/admin", "/admin/products", "/admin/reviews"] {
            let response = app
                .clone()
                .oneshot(get_with_cookie(uri, Some(&cookie)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_admin_dashboard_degrades_to_toast() {
        let app = test_app(unreachable_backend());
        let cookie = login_as(&app, "ADMIN").await;

        let response = app
            .oneshot(get_with_cookie("/admin", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Could not load dashboard statistics"));
    }

    async fn body_text(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_admin_products_lists_backend_page() {
        let backend = Router::new()
            .route(
                "/admin/products",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    let data = if params.get("search").map(String::as_str) == Some("kraft") {
                        json!([{"id": 3, "name": "Kraft Gift Box", "price": "12.00", "stock": 8}])
                    } else {
                        json!([])
                    };
                    Json(json!({
                        "data": data,
                        "meta": {"total": 1, "page": 1, "limit": 20, "totalPages": 1}
                    }))
                }),
            )
            .route("/categories", get(|| async { Json(json!([])) }));
        let app = test_app(spawn_backend(backend).await);
        let cookie = login_as(&app, "ADMIN").await;

        let response = app
            .oneshot(get_with_cookie("/admin/products?search=kraft", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Kraft Gift Box"));
        assert!(html.contains("$12.00"));
    }

    #[tokio::test]
    async fn test_checkout_renders_when_promotions_fail() {
        let backend = Router::new()
            .route(
                "/cart",
                get(|| async {
                    Json(json!({
                        "id": 1,
                        "items": [{
                            "id": 1,
                            "productId": 5,
                            "quantity": 2,
                            "product": {"id": 5, "name": "Thank You Card", "price": "3.00", "stock": 10}
                        }],
                        "subtotal": "6.00",
                        "totalItems": 2
                    }))
                }),
            )
            .route("/addresses", get(|| async { Json(json!([])) }))
            .route(
                "/payment-methods",
                get(|| async { Json(json!([{"id": 1, "code": "COD", "name": "Cash on delivery"}])) }),
            )
            .route(
                "/promotions/preview",
                get(|| async {
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "preview down"})))
                }),
            );
        let app = test_app(spawn_backend(backend).await);
        let cookie = login_as(&app, "CUSTOMER").await;

        let response = app
            .oneshot(get_with_cookie("/checkout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Could not load promotions"));
        assert!(html.contains("Cash on delivery"));
        assert!(html.contains("Thank You Card"));
    }

    #[tokio::test]
    async fn test_notification_open_flashes_mark_read_failure() {
        let backend = Router::new()
            .route(
                "/notifications",
                get(|| async {
                    Json(json!([{"id": 3, "title": "Order shipped", "link": "/orders/42"}]))
                }),
            )
            .route(
                "/notifications/{id}/read",
                patch(|| async {
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "db down"})))
                }),
            );
        let app = test_app(spawn_backend(backend).await);
        let cookie = login_as(&app, "CUSTOMER").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/notifications/3/read")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/orders?orderId=42");

        let response = app
            .oneshot(get_with_cookie("/notifications", Some(&cookie)))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Something went wrong. Please try again."));
    }

    #[tokio::test]
    async fn test_guest_cart_add_then_count() {
        let backend = Router::new().route(
            "/products/{id}",
            get(|| async {
                Json(json!({"id": 7, "name": "Birthday Card", "price": "4.50", "stock": 2}))
            }),
        );
        let app = test_app(spawn_backend(backend).await);

        let add = |cookie: Option<String>| {
            let mut builder = Request::builder()
                .method("POST")
                .uri("/cart/add")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("HX-Request", "true");
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            builder.body(Body::from("product_id=7&quantity=1")).unwrap()
        };

        let response = app.clone().oneshot(add(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let trigger = response.headers()["HX-Trigger"].to_str().unwrap().to_string();
        assert!(trigger.contains("cart-updated"));
        let cookie = session_cookie(&response);

        // Third unit exceeds the recorded stock of 2.
        app.clone().oneshot(add(Some(cookie.clone()))).await.unwrap();
        let response = app.clone().oneshot(add(Some(cookie.clone()))).await.unwrap();
        let trigger = response.headers()["HX-Trigger"].to_str().unwrap().to_string();
        assert!(trigger.contains("Only 2 of"));

        let response = app
            .oneshot(get_with_cookie("/cart/count", Some(&cookie)))
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(body.to_vec()).unwrap().contains('2'));
    }

    #[tokio::test]
    async fn test_expired_token_logs_out() {
        let backend = Router::new().route(
            "/orders",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"message": "jwt expired"}))) }),
        );
        let app = test_app(spawn_backend(backend).await);
        let cookie = login_as(&app, "CUSTOMER").await;

        let response = app
            .clone()
            .oneshot(get_with_cookie("/orders", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");

        // The session no longer holds the user.
        let response = app
            .oneshot(get_with_cookie("/account", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/auth/login?next=%2Faccount");
    }

    #[tokio::test]
    async fn test_unknown_content_page_is_404() {
        let app = test_app(unreachable_backend());
        let response = app
            .oneshot(get_with_cookie("/pages/nope", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_logout_redirects_home() {
        let app = test_app(unreachable_backend());
        let cookie = login_as(&app, "CUSTOMER").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/logout")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
