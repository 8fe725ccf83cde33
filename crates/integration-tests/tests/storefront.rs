//! Smoke tests for the public storefront.

#![allow(clippy::unwrap_used)]

use papergift_integration_tests::TestContext;
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_health() {
    let ctx = TestContext::new();
    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "requires a running storefront and backend"]
async fn test_readiness_reports_dependencies() {
    let ctx = TestContext::new();
    let resp = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["database"], true);
    assert_eq!(body["backend"], true);
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_home_sets_security_headers() {
    let ctx = TestContext::new();
    let resp = ctx.client.get(ctx.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("content-security-policy"));
    assert!(resp.headers().contains_key("x-request-id"));
    assert!(resp.text().await.unwrap().contains("Papergift"));
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_guest_is_sent_to_login() {
    let ctx = TestContext::new();
    for path in ["/checkout", "/orders", "/account", "/admin"] {
        let resp = ctx.client.get(ctx.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        let location = resp.headers()["location"].to_str().unwrap();
        assert!(location.starts_with("/auth/login"), "{path} -> {location}");
    }
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_unknown_page_is_not_found() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .get(ctx.url("/pages/does-not-exist"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running storefront and backend"]
async fn test_guest_cart_count_starts_empty() {
    let ctx = TestContext::new();
    let resp = ctx.client.get(ctx.url("/cart/count")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap().trim(), "");
}

#[tokio::test]
#[ignore = "requires a running storefront, backend and admin credentials"]
async fn test_admin_login_opens_dashboard() {
    let Some((email, password)) = TestContext::admin_credentials() else {
        return;
    };
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .post(ctx.url("/auth/login"))
        .form(&[("email", email.as_str()), ("password", password.as_str()), ("next", "/admin")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/admin");

    let resp = ctx.client.get(ctx.url("/admin")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Dashboard"));
}
