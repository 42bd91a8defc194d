mod item;
mod item_summary;
mod price_change;
mod price_event;
mod price_point;

pub use item::{CreateItem, Item};
pub use item_summary::{ChartPoint, ItemSummary, PriceChanges};
pub use price_change::{ChangeQuery, LookbackWindow, PriceChange};
pub use price_event::{ChangeOperation, ChangedTable, PriceEvent, StoreEvent};
pub use price_point::{CreatePricePoint, NewPricePoint, PriceQuery, PricePoint};
