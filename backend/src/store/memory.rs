use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{PriceStore, StoreError, EVENT_CAPACITY};
use crate::models::{ChangeOperation, Item, NewPricePoint, PriceEvent, PricePoint, StoreEvent};

#[derive(Default)]
struct Tables {
    items: Vec<Item>,
    prices: Vec<PricePoint>,
}

/// Process-local store with the same uniqueness and reference rules as the
/// Postgres schema. Used when no database is configured.
pub struct MemoryPriceStore {
    tables: RwLock<Tables>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tables: RwLock::new(Tables::default()),
            events,
        }
    }
}

impl Default for MemoryPriceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let mut items = self.tables.read().items.clone();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn insert_item(&self, name: &str) -> Result<Item, StoreError> {
        let item = {
            let mut tables = self.tables.write();
            if tables.items.iter().any(|i| i.name == name) {
                return Err(StoreError::Conflict(format!("An item named '{}' already exists", name)));
            }
            let item = Item::new(name.to_string());
            tables.items.push(item.clone());
            item
        };

        let _ = self.events.send(StoreEvent::Changed(PriceEvent::item(ChangeOperation::Insert, item.id)));
        Ok(item)
    }

    async fn list_prices(&self, item_id: Option<Uuid>) -> Result<Vec<PricePoint>, StoreError> {
        let mut prices: Vec<PricePoint> = self.tables.read().prices
            .iter()
            .filter(|p| item_id.map_or(true, |id| p.item_id == id))
            .cloned()
            .collect();
        prices.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(prices)
    }

    async fn latest_prices(&self) -> Result<Vec<PricePoint>, StoreError> {
        let tables = self.tables.read();
        let latest = tables.items
            .iter()
            .filter_map(|item| {
                tables.prices
                    .iter()
                    .filter(|p| p.item_id == item.id)
                    .max_by_key(|p| p.date)
                    .cloned()
            })
            .collect();
        Ok(latest)
    }

    async fn insert_price(&self, point: NewPricePoint) -> Result<PricePoint, StoreError> {
        let inserted = {
            let mut tables = self.tables.write();
            if !tables.items.iter().any(|i| i.id == point.item_id) {
                return Err(StoreError::UnknownItem(point.item_id));
            }
            if tables.prices.iter().any(|p| p.item_id == point.item_id && p.date == point.date) {
                return Err(StoreError::Conflict(format!(
                    "Item {} already has a price on {}", point.item_id, point.date
                )));
            }
            let inserted = PricePoint::new(point.item_id, point.price, point.date);
            tables.prices.push(inserted.clone());
            inserted
        };

        let _ = self.events.send(StoreEvent::Changed(PriceEvent::price(
            ChangeOperation::Insert,
            inserted.item_id,
        )));
        Ok(inserted)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
