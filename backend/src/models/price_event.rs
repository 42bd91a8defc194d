use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOperation {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangedTable {
    Items,
    #[default]
    Prices,
}

/// A row-level change on `items` or `prices`, as published by the change
/// triggers. `item_id` is the affected item in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEvent {
    #[serde(default)]
    pub table: ChangedTable,
    pub operation: ChangeOperation,
    pub item_id: Uuid,
}

impl PriceEvent {
    pub fn price(operation: ChangeOperation, item_id: Uuid) -> Self {
        Self { table: ChangedTable::Prices, operation, item_id }
    }

    pub fn item(operation: ChangeOperation, item_id: Uuid) -> Self {
        Self { table: ChangedTable::Items, operation, item_id }
    }
}

/// What a store subscriber receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Changed(PriceEvent),
    /// The store lost its change feed for a while; anything derived from
    /// it must be rebuilt.
    Resync,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_trigger_payload() {
        let payload = r#"{"operation":"INSERT","item_id":"7b1f7c1e-3c1a-4a39-9d1c-2a9b8f3e4d10"}"#;
        let event: PriceEvent = serde_json::from_str(payload).unwrap();

        assert_eq!(event.operation, ChangeOperation::Insert);
        assert_eq!(event.table, ChangedTable::Prices);
        assert_eq!(event.item_id.to_string(), "7b1f7c1e-3c1a-4a39-9d1c-2a9b8f3e4d10");
    }

    #[test]
    fn test_decodes_item_trigger_payload() {
        let payload = r#"{"table":"items","operation":"INSERT","item_id":"7b1f7c1e-3c1a-4a39-9d1c-2a9b8f3e4d10"}"#;
        let event: PriceEvent = serde_json::from_str(payload).unwrap();

        assert_eq!(event.table, ChangedTable::Items);
        assert_eq!(event.operation, ChangeOperation::Insert);
    }

    #[test]
    fn test_rejects_unknown_operation() {
        let payload = r#"{"operation":"TRUNCATE","item_id":"7b1f7c1e-3c1a-4a39-9d1c-2a9b8f3e4d10"}"#;
        assert!(serde_json::from_str::<PriceEvent>(payload).is_err());
    }
}
