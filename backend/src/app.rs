use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{self, API_KEY_HEADER};
use crate::routes::{health, items, prices};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let api = Router::<AppState>::new()
        .nest("/items", items::router())
        .nest("/prices", prices::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key));

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(API_KEY_HEADER),
        ])
}
