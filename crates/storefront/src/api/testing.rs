//! In-process mock backend for client and route tests.

use std::time::Duration;

use axum::Router;
use url::Url;

use super::ApiClient;
use crate::config::BackendConfig;

/// Serve `router` under `/api` on an ephemeral port and return a client
/// pointed at it.
pub(crate) async fn spawn_backend(router: Router) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");
    let app = Router::new().nest("/api", router);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });

    ApiClient::new(&backend_config(&format!("http://{addr}/api/"))).expect("api client")
}

/// Client pointed at an address nothing listens on.
pub(crate) fn unreachable_backend() -> ApiClient {
    ApiClient::new(&backend_config("http://127.0.0.1:9/api/")).expect("api client")
}

fn backend_config(base: &str) -> BackendConfig {
    BackendConfig {
        base_url: Url::parse(base).expect("base url"),
        api_token: None,
        timeout: Duration::from_secs(5),
        cache_ttl: Duration::from_secs(60),
    }
}
