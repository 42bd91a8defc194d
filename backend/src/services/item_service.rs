use tracing::error;

use crate::errors::AppError;
use crate::models::{CreateItem, Item};
use crate::services::summary_cache::SummaryCache;
use crate::store::PriceStore;

pub async fn create(
    store: &dyn PriceStore,
    cache: &SummaryCache,
    input: CreateItem,
) -> Result<Item, AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Item name cannot be empty".into()));
    }
    let item = store.insert_item(name).await.map_err(|e| {
        error!("Failed to create item '{}': {}", name, e);
        AppError::from(e)
    })?;
    // the store's own event may arrive later than the caller's next read
    cache.invalidate();
    Ok(item)
}

pub async fn fetch_all(store: &dyn PriceStore) -> Result<Vec<Item>, AppError> {
    let items = store.list_items().await.map_err(|e| {
        error!("Failed to fetch items: {}", e);
        AppError::from(e)
    })?;
    Ok(items)
}
