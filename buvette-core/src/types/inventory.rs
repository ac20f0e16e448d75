use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{Buvette, Product};
use crate::domain::status::SnapshotKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub id: i64,
    pub event_id: i64,
    pub buvette_id: i64,
    #[serde(rename = "type")]
    pub kind: SnapshotKind,
    pub created_at: DateTime<Utc>,
    pub items: Vec<InventoryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub snapshot_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub loss: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryItem {
    pub product_id: i64,
    pub quantity: i32,
    pub loss: Option<i32>,
    pub comment: Option<String>,
    pub declared_sales: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryDelta {
    pub id: i64,
    pub event_id: i64,
    pub buvette_id: i64,
    pub product_id: i64,
    pub initial_qty: Option<i32>,
    pub final_qty: Option<i32>,
    pub theoretical_sales: Option<i32>,
    pub delta: Option<i32>,
    pub restock_quantity: Option<i32>,
    pub is_restocked: bool,
    pub has_shortage: bool,
    pub shortage_qty: Option<i32>,
}

/// A delta row with the product and buvette it concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaWithRefs {
    #[serde(flatten)]
    pub delta: InventoryDelta,
    pub product: Product,
    pub buvette: Buvette,
}

/// One line of the counting sheet posted by a buvette. Absent quantities keep
/// whatever was stored before; flags default to false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetUpdate {
    pub product_id: i64,
    #[serde(default)]
    pub initial_qty: Option<i32>,
    #[serde(default)]
    pub final_qty: Option<i32>,
    #[serde(default)]
    pub restock_qty: Option<i32>,
    #[serde(default)]
    pub is_restocked: Option<bool>,
    #[serde(default)]
    pub has_shortage: Option<bool>,
    #[serde(default)]
    pub shortage_qty: Option<i32>,
}
