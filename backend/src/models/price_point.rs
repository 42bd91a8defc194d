use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// One dated price observation for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PricePoint {
    pub id: Uuid,
    pub item_id: Uuid,
    pub price: BigDecimal,         // NUMERIC(10, 2)
    pub date: NaiveDate,           // DATE
    pub created_at: DateTime<Utc>, // TIMESTAMPTZ
}

impl PricePoint {
    pub(crate) fn new(item_id: Uuid, price: BigDecimal, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            price,
            date,
            created_at: Utc::now(),
        }
    }
}

/// Raw form submission for a new price point. Every field arrives as a string
/// and is validated by the price service before it reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePricePoint {
    pub item_id: String,
    pub price: String,
    pub date: String,
}

/// A validated price point ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPricePoint {
    pub item_id: Uuid,
    pub price: BigDecimal,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub item_id: Option<Uuid>,
}
