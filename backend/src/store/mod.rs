mod memory;
mod postgres;

pub use memory::MemoryPriceStore;
pub use postgres::PgPriceStore;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{Item, NewPricePoint, PricePoint, StoreEvent};

/// Buffered change events per subscriber before it starts lagging.
pub const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unknown item {0}")]
    UnknownItem(Uuid),

    #[error("database error: {0}")]
    Db(sqlx::Error),

    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(value.to_string())
            }
            other => StoreError::Db(other),
        }
    }
}

/// The data store the service reads items and prices from.
///
/// Implementations own their connection resources and are constructed once
/// at startup; handlers reach them through `AppState`.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Short name for logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Cheap round trip proving the store can serve requests.
    async fn ping(&self) -> Result<(), StoreError>;

    /// All items, ordered by name.
    async fn list_items(&self) -> Result<Vec<Item>, StoreError>;

    async fn insert_item(&self, name: &str) -> Result<Item, StoreError>;

    /// Price points ordered by date ascending, optionally for one item.
    async fn list_prices(&self, item_id: Option<Uuid>) -> Result<Vec<PricePoint>, StoreError>;

    /// The most recent price point of every item that has one.
    async fn latest_prices(&self) -> Result<Vec<PricePoint>, StoreError>;

    /// Fails with `Conflict` when the item already has a price on that date
    /// and with `UnknownItem` when the item does not exist.
    async fn insert_price(&self, point: NewPricePoint) -> Result<PricePoint, StoreError>;

    /// Row-level changes on items and prices. Delivery is at-least-once and
    /// unordered relative to responses of the other methods. A `Resync` means
    /// changes may have been missed.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
