use std::collections::HashMap;
use std::sync::Arc;

use bigdecimal::ToPrimitive;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ChartPoint, Item, ItemSummary, LookbackWindow, PriceChanges, PricePoint};
use crate::services::price_change_service::compute_change;
use crate::services::summary_cache::SummaryCache;
use crate::store::PriceStore;

/// One summary per item, in the order the items are given.
pub fn build_summaries(items: &[Item], prices: &[PricePoint]) -> Vec<ItemSummary> {
    let mut by_item: HashMap<Uuid, Vec<PricePoint>> = HashMap::new();
    for price in prices {
        by_item
            .entry(price.item_id)
            .or_insert_with(Vec::new)
            .push(price.clone());
    }

    items.iter()
        .map(|item| {
            let mut series = by_item.remove(&item.id).unwrap_or_default();
            series.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
            summarize(item, &series)
        })
        .collect()
}

fn summarize(item: &Item, series: &[PricePoint]) -> ItemSummary {
    let latest = series.last();

    let mut changes = PriceChanges::default();
    for window in LookbackWindow::ALL {
        let change = compute_change(series, window.days());
        match window {
            LookbackWindow::Week => changes.week = change,
            LookbackWindow::Month => changes.month = change,
            LookbackWindow::Year => changes.year = change,
        }
    }

    let history = series.iter()
        .map(|p| ChartPoint {
            date: p.date,
            label: p.date.format("%b %-d").to_string(),
            price: p.price.to_f64().unwrap_or_default(),
        })
        .collect();

    ItemSummary {
        item: item.clone(),
        latest_price: latest.map(|p| p.price.clone()),
        latest_date: latest.map(|p| p.date),
        changes,
        history,
    }
}

pub async fn get_summaries(
    store: &dyn PriceStore,
    cache: &SummaryCache,
) -> Result<Arc<Vec<ItemSummary>>, AppError> {
    if let Some(cached) = cache.get() {
        return Ok(cached);
    }

    let generation = cache.generation();
    let items = store.list_items().await.map_err(|e| {
        error!("Failed to fetch items for summaries: {}", e);
        AppError::from(e)
    })?;
    let prices = store.list_prices(None).await.map_err(|e| {
        error!("Failed to fetch prices for summaries: {}", e);
        AppError::from(e)
    })?;

    let summaries = Arc::new(build_summaries(&items, &prices));
    if cache.store(generation, summaries.clone()) {
        info!("✓ Rebuilt summaries for {} items", summaries.len());
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    fn item(name: &str) -> Item {
        Item::new(name.to_string())
    }

    fn point(item: &Item, date: &str, price: &str) -> PricePoint {
        PricePoint::new(
            item.id,
            BigDecimal::from_str(price).unwrap(),
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        )
    }

    #[test]
    fn test_summary_per_item_in_given_order() {
        let widget = item("Widget");
        let gadget = item("Gadget");
        let prices = vec![
            point(&widget, "2024-01-08", "11.00"),
            point(&gadget, "2024-01-01", "5.00"),
            point(&widget, "2024-01-01", "10.00"),
        ];

        let summaries = build_summaries(&[gadget.clone(), widget.clone()], &prices);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].item.id, gadget.id);
        assert_eq!(summaries[1].item.id, widget.id);
    }

    #[test]
    fn test_latest_price_and_history_are_sorted() {
        let widget = item("Widget");
        let prices = vec![
            point(&widget, "2024-01-08", "11.00"),
            point(&widget, "2024-01-01", "10.00"),
        ];

        let summary = &build_summaries(&[widget], &prices)[0];

        assert_eq!(summary.latest_price, Some(BigDecimal::from_str("11.00").unwrap()));
        assert_eq!(summary.latest_date, NaiveDate::from_ymd_opt(2024, 1, 8));
        let labels: Vec<&str> = summary.history.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan 1", "Jan 8"]);
        assert_eq!(summary.history[1].price, 11.0);
    }

    #[test]
    fn test_changes_for_each_window() {
        let widget = item("Widget");
        let prices = vec![
            point(&widget, "2023-03-01", "50.00"),
            point(&widget, "2024-01-01", "80.00"),
            point(&widget, "2024-01-25", "90.00"),
            point(&widget, "2024-01-30", "99.00"),
        ];

        let changes = build_summaries(&[widget], &prices)[0].changes.clone();

        // 7d: baseline 2024-01-25, 30d: 2024-01-01, 365d: 2023-03-01
        assert_eq!(changes.week.map(|c| c.percentage), Some(10.0));
        assert_eq!(changes.month.map(|c| c.percentage), Some(23.8));
        assert_eq!(changes.year.map(|c| c.percentage), Some(98.0));
        assert!(changes.year.unwrap().increased);
    }

    #[test]
    fn test_item_without_prices_has_empty_summary() {
        let lonely = item("Lonely");
        let summary = &build_summaries(&[lonely], &[])[0];

        assert!(summary.latest_price.is_none());
        assert!(summary.history.is_empty());
        assert_eq!(summary.changes, PriceChanges::default());
    }

    #[test]
    fn test_prices_of_unknown_items_are_ignored() {
        let widget = item("Widget");
        let stray = PricePoint {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            price: BigDecimal::from_str("1.00").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_at: Utc::now(),
        };

        let summaries = build_summaries(&[widget], &[stray]);
        assert!(summaries[0].history.is_empty());
    }
}
