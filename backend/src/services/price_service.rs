use std::str::FromStr;
use std::sync::OnceLock;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use regex::Regex;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CreatePricePoint, LookbackWindow, NewPricePoint, PriceChange, PricePoint};
use crate::services::price_change_service::compute_change;
use crate::services::summary_cache::SummaryCache;
use crate::store::PriceStore;

/// Prices are stored as NUMERIC(10, 2).
pub const MAX_INTEGER_DIGITS: usize = 8;

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.?\d{0,2}$").expect("price pattern is valid"))
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"))
}

/// Checks a submitted price point: the item id must be a UUID, the price a
/// plain decimal with at most two fractional digits that fits the price
/// column, and the date a real `YYYY-MM-DD` calendar date.
pub fn validate(input: &CreatePricePoint) -> Result<NewPricePoint, AppError> {
    let item_id = Uuid::parse_str(input.item_id.trim())
        .map_err(|_| AppError::Validation("Invalid item id".into()))?;

    if !price_pattern().is_match(&input.price) {
        return Err(AppError::Validation("Invalid price format".into()));
    }
    let integer_part = input.price.split('.').next().unwrap_or_default();
    if integer_part.trim_start_matches('0').len() > MAX_INTEGER_DIGITS {
        return Err(AppError::Validation(format!(
            "Price must have at most {} digits before the decimal point", MAX_INTEGER_DIGITS
        )));
    }
    // "10." is accepted by the pattern and means 10
    let price = BigDecimal::from_str(input.price.trim_end_matches('.'))
        .map_err(|_| AppError::Validation("Invalid price format".into()))?;

    if !date_pattern().is_match(&input.date) {
        return Err(AppError::Validation("Invalid date format".into()));
    }
    let date = NaiveDate::parse_from_str(&input.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", input.date)))?;

    Ok(NewPricePoint { item_id, price, date })
}

pub async fn add(
    store: &dyn PriceStore,
    cache: &SummaryCache,
    input: CreatePricePoint,
) -> Result<PricePoint, AppError> {
    let new_point = validate(&input)?;
    let item_id = new_point.item_id;

    let inserted = store.insert_price(new_point).await.map_err(|e| {
        error!("Failed to add price for item {}: {}", item_id, e);
        AppError::from(e)
    })?;

    cache.invalidate();
    info!("✓ Recorded price {} for item {} on {}", inserted.price, item_id, inserted.date);
    Ok(inserted)
}

pub async fn get_history(
    store: &dyn PriceStore,
    item_id: Option<Uuid>,
) -> Result<Vec<PricePoint>, AppError> {
    store.list_prices(item_id).await.map_err(|e| {
        error!("Failed to fetch price history (item: {:?}): {}", item_id, e);
        AppError::from(e)
    })
}

pub async fn get_latest(store: &dyn PriceStore) -> Result<Vec<PricePoint>, AppError> {
    store.latest_prices().await.map_err(|e| {
        error!("Failed to fetch latest prices: {}", e);
        AppError::from(e)
    })
}

/// Change over the trailing `days` for one item; defaults to one week.
pub async fn get_change(
    store: &dyn PriceStore,
    item_id: Uuid,
    days: Option<u32>,
) -> Result<Option<PriceChange>, AppError> {
    let days = days.unwrap_or(LookbackWindow::Week.days());
    if days == 0 {
        return Err(AppError::Validation("Lookback must be at least one day".into()));
    }

    let items = store.list_items().await.map_err(AppError::from)?;
    if !items.iter().any(|i| i.id == item_id) {
        return Err(AppError::NotFound(format!("Item {} not found", item_id)));
    }

    let prices = get_history(store, Some(item_id)).await?;
    Ok(compute_change(&prices, days))
}
