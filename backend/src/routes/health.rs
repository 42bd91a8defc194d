use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, warn};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/ready", get(ready))
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub store: &'static str,
}

async fn health() -> &'static str {
    info!("GET /health - Liveness check");
    "OK"
}

/// 503 while the data store cannot be reached.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let store = state.store.backend_name();
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(Readiness { status: "ready", store })),
        Err(e) => {
            warn!("GET /health/ready - {} store unreachable: {}", store, e);
            (StatusCode::SERVICE_UNAVAILABLE, Json(Readiness { status: "unavailable", store }))
        }
    }
}
