//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness report.
#[derive(Debug, Serialize)]
pub struct Readiness {
    pub database: bool,
    pub backend: bool,
}

/// Readiness health check endpoint.
///
/// Checks the session database and the backend API. Returns 503 Service
/// Unavailable if either is not reachable.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let (database, backend) = tokio::join!(
        sqlx::query("SELECT 1").fetch_one(state.pool()),
        state.api().health(),
    );

    if let Err(e) = &database {
        tracing::warn!(error = %e, "Readiness: database unreachable");
    }
    if let Err(e) = &backend {
        tracing::warn!(error = %e, "Readiness: backend unreachable");
    }

    let report = Readiness {
        database: database.is_ok(),
        backend: backend.is_ok(),
    };
    let status = if report.database && report.backend {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
