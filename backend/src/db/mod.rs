pub mod item_queries;
pub mod price_queries;

/// Channel the `notify_price_change` trigger publishes on.
pub const PRICE_CHANNEL: &str = "price_changes";
