use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{CreateItem, Item, ItemSummary};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item).get(fetch_items))
        .route("/summary", get(get_summaries))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(data): Json<CreateItem>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    info!("POST /items - Creating item");
    let item = services::item_service::create(state.store.as_ref(), &state.summary_cache, data).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn fetch_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<Item>>, AppError> {
    info!("GET /items - Fetching all items");
    let items = services::item_service::fetch_all(state.store.as_ref()).await?;
    Ok(Json(items))
}

pub async fn get_summaries(
    State(state): State<AppState>,
) -> Result<Json<Vec<ItemSummary>>, AppError> {
    info!("GET /items/summary - Building item summaries");
    let summaries = services::summary_service::get_summaries(state.store.as_ref(), &state.summary_cache)
        .await
        .map_err(|e| {
            error!("Failed to build item summaries: {}", e);
            e
        })?;
    Ok(Json(summaries.as_ref().clone()))
}
