use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{PriceStore, StoreError, EVENT_CAPACITY};
use crate::db::{self, PRICE_CHANNEL};
use crate::models::{Item, NewPricePoint, PriceEvent, PricePoint, StoreEvent};

const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct PgPriceStore {
    pool: PgPool,
    events: broadcast::Sender<StoreEvent>,
    listener: JoinHandle<()>,
}

impl PgPriceStore {
    /// Wraps the pool and starts listening for item and price change
    /// notifications.
    /// Must be called from within a tokio runtime.
    pub fn new(pool: PgPool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let listener = tokio::spawn(listen_for_changes(pool.clone(), events.clone()));
        Self { pool, events, listener }
    }
}

impl Drop for PgPriceStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

#[async_trait]
impl PriceStore for PgPriceStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        Ok(db::item_queries::fetch_all(&self.pool).await?)
    }

    async fn insert_item(&self, name: &str) -> Result<Item, StoreError> {
        db::item_queries::insert(&self.pool, Item::new(name.to_string()))
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    StoreError::Conflict(format!("An item named '{}' already exists", name))
                }
                other => other.into(),
            })
    }

    async fn list_prices(&self, item_id: Option<Uuid>) -> Result<Vec<PricePoint>, StoreError> {
        Ok(db::price_queries::fetch_all(&self.pool, item_id).await?)
    }

    async fn latest_prices(&self) -> Result<Vec<PricePoint>, StoreError> {
        Ok(db::price_queries::fetch_latest_batch(&self.pool).await?)
    }

    async fn insert_price(&self, point: NewPricePoint) -> Result<PricePoint, StoreError> {
        let item_id = point.item_id;
        let date = point.date;
        db::price_queries::insert(&self.pool, PricePoint::new(item_id, point.price, date))
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    StoreError::Conflict(format!("Item {} already has a price on {}", item_id, date))
                }
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    StoreError::UnknownItem(item_id)
                }
                other => other.into(),
            })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

async fn listen_for_changes(pool: PgPool, events: broadcast::Sender<StoreEvent>) {
    loop {
        if let Err(e) = forward_notifications(&pool, &events).await {
            warn!("Price change listener failed, reconnecting in {}s: {}",
                  LISTENER_RETRY_DELAY.as_secs(), e);
        }
        // whatever was notified while we were away is lost
        let _ = events.send(StoreEvent::Resync);
        tokio::time::sleep(LISTENER_RETRY_DELAY).await;
    }
}

async fn forward_notifications(
    pool: &PgPool,
    events: &broadcast::Sender<StoreEvent>,
) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(PRICE_CHANNEL).await?;
    info!("👂 Listening for price changes on channel '{}'", PRICE_CHANNEL);

    loop {
        // `try_recv` reconnects on the next call after yielding `None`
        let notification = listener.try_recv().await?;
        if let Some(event) = event_for(notification.as_ref().map(|n| n.payload())) {
            // No receivers is fine; nobody is watching right now
            let _ = events.send(event);
        }
    }
}

/// Maps what the listener yielded to the event subscribers should see.
/// `None` means the connection dropped and notifications may have been lost.
fn event_for(payload: Option<&str>) -> Option<StoreEvent> {
    let Some(payload) = payload else {
        warn!("Price change listener lost its connection, asking subscribers to resync");
        return Some(StoreEvent::Resync);
    };
    match serde_json::from_str::<PriceEvent>(payload) {
        Ok(event) => Some(StoreEvent::Changed(event)),
        Err(e) => {
            error!("Ignoring malformed price notification '{}': {}", payload, e);
            None
        }
    }
}
