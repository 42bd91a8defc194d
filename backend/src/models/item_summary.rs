use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Item, PriceChange};

/// Everything the item grid renders for one item: the latest price, the
/// trailing-window changes, and the series for its line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub item: Item,
    pub latest_price: Option<BigDecimal>,
    pub latest_date: Option<NaiveDate>,
    pub changes: PriceChanges,
    pub history: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceChanges {
    pub week: Option<PriceChange>,
    pub month: Option<PriceChange>,
    pub year: Option<PriceChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub label: String, // e.g. "Jan 8"
    pub price: f64,
}
