use std::convert::Infallible;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ChangeQuery, ChangedTable, CreatePricePoint, PriceChange, PricePoint, PriceQuery, StoreEvent};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_prices).post(add_price))
        .route("/latest", get(get_latest_prices))
        .route("/events", get(price_events))
        .route("/:item_id", get(get_item_prices))
        .route("/:item_id/change", get(get_item_change))
}

#[derive(Debug, Serialize)]
pub struct AddPriceResponse {
    pub message: String,
    pub price: PricePoint,
}

pub async fn get_prices(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<Vec<PricePoint>>, AppError> {
    info!("GET /prices - Getting price history (item: {:?})", query.item_id);
    let prices = services::price_service::get_history(state.store.as_ref(), query.item_id).await?;
    Ok(Json(prices))
}

pub async fn add_price(
    State(state): State<AppState>,
    Json(data): Json<CreatePricePoint>,
) -> Result<(StatusCode, Json<AddPriceResponse>), AppError> {
    info!("POST /prices - Adding price for item {}", data.item_id);
    let price = services::price_service::add(state.store.as_ref(), &state.summary_cache, data).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddPriceResponse {
            message: "Price added successfully".to_string(),
            price,
        }),
    ))
}

pub async fn get_latest_prices(
    State(state): State<AppState>,
) -> Result<Json<Vec<PricePoint>>, AppError> {
    info!("GET /prices/latest - Getting latest price of every item");
    let prices = services::price_service::get_latest(state.store.as_ref()).await?;
    Ok(Json(prices))
}

pub async fn get_item_prices(
    Path(item_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PricePoint>>, AppError> {
    info!("GET /prices/{} - Getting price history", item_id);
    let prices = services::price_service::get_history(state.store.as_ref(), Some(item_id)).await?;
    Ok(Json(prices))
}

pub async fn get_item_change(
    Path(item_id): Path<Uuid>,
    Query(query): Query<ChangeQuery>,
    State(state): State<AppState>,
) -> Result<Json<Option<PriceChange>>, AppError> {
    info!("GET /prices/{}/change - Computing change over {:?} days", item_id, query.days);
    let change = services::price_service::get_change(state.store.as_ref(), item_id, query.days).await?;
    Ok(Json(change))
}

pub async fn price_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("GET /prices/events - Subscribing to price changes");
    Sse::new(event_stream(state.store.subscribe())).keep_alive(KeepAlive::default())
}

/// `price` and `item` events carry a `PriceEvent`; a `resync` event tells the
/// client it missed some changes and should refetch everything.
fn event_stream(
    receiver: broadcast::Receiver<StoreEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(receiver, |mut receiver| async move {
        loop {
            let event = match receiver.recv().await {
                Ok(StoreEvent::Changed(change)) => {
                    let name = match change.table {
                        ChangedTable::Items => "item",
                        ChangedTable::Prices => "price",
                    };
                    match Event::default().event(name).json_data(change) {
                        Ok(event) => event,
                        Err(e) => {
                            warn!("Failed to encode {} event: {}", name, e);
                            continue;
                        }
                    }
                }
                Ok(StoreEvent::Resync) => Event::default().event("resync").data("0"),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged behind by {} store events", skipped);
                    Event::default().event("resync").data(skipped.to_string())
                }
                Err(RecvError::Closed) => return None,
            };
            return Some((Ok::<_, Infallible>(event), receiver));
        }
    })
}
