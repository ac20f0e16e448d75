use serde::{Deserialize, Serialize};

use crate::domain::{
    status::SnapshotKind,
    validation::{ValidationError, require_non_negative},
};
use crate::types::{
    catalog::BuvetteProduct,
    inventory::{InventoryDelta, NewInventoryItem, SheetUpdate},
};

pub const DEFAULT_CATEGORY: &str = "Divers";
pub const DEFAULT_UNIT: &str = "PCE";

/// One row of a buvette's counting sheet: the stocked product merged with
/// whatever has been counted so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetLine {
    pub product_id: i64,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub initial_qty: Option<i32>,
    pub final_qty: Option<i32>,
    pub restock_qty: Option<i32>,
    pub is_restocked: bool,
    pub has_shortage: bool,
    pub shortage_qty: Option<i32>,
    pub delta_id: Option<i64>,
}

impl SheetLine {
    pub fn merge(link: &BuvetteProduct, delta: Option<&InventoryDelta>) -> Self {
        let product = &link.product;
        Self {
            product_id: product.id,
            name: product.name.clone(),
            category: product
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            unit: product
                .unit
                .clone()
                .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            initial_qty: delta.and_then(|d| d.initial_qty),
            final_qty: delta.and_then(|d| d.final_qty),
            restock_qty: delta.and_then(|d| d.restock_quantity),
            is_restocked: delta.is_some_and(|d| d.is_restocked),
            has_shortage: delta.is_some_and(|d| d.has_shortage),
            shortage_qty: delta.and_then(|d| d.shortage_qty),
            delta_id: delta.map(|d| d.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySheet {
    pub event_id: i64,
    pub buvette_id: i64,
    pub products: Vec<SheetLine>,
}

/// Builds the sheet for every stocked product, in display order.
pub fn build_sheet(
    event_id: i64,
    buvette_id: i64,
    links: &[BuvetteProduct],
    deltas: &[InventoryDelta],
) -> InventorySheet {
    let products = links
        .iter()
        .map(|link| {
            let delta = deltas.iter().find(|d| d.product_id == link.product_id);
            SheetLine::merge(link, delta)
        })
        .collect();
    InventorySheet {
        event_id,
        buvette_id,
        products,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSheetRequest {
    pub items: Vec<SheetUpdate>,
}

impl SaveSheetRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for item in &self.items {
            require_non_negative("initial_qty", item.initial_qty)?;
            require_non_negative("final_qty", item.final_qty)?;
            require_non_negative("restock_qty", item.restock_qty)?;
            require_non_negative("shortage_qty", item.shortage_qty)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotItemInput {
    pub product_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub loss: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub declared_sales: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRequest {
    #[serde(rename = "type")]
    pub kind: SnapshotKind,
    pub items: Vec<SnapshotItemInput>,
}

impl SnapshotRequest {
    pub fn into_items(self) -> Result<(SnapshotKind, Vec<NewInventoryItem>), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::Missing { field: "items" });
        }
        let items = self
            .items
            .into_iter()
            .map(|item| {
                require_non_negative("quantity", Some(item.quantity))?;
                require_non_negative("loss", item.loss)?;
                require_non_negative("declared_sales", item.declared_sales)?;
                Ok(NewInventoryItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    loss: Some(item.loss.unwrap_or(0)),
                    comment: item.comment.filter(|c| !c.is_empty()),
                    declared_sales: item.declared_sales,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        Ok((self.kind, items))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotQuery {
    #[serde(default, rename = "type")]
    pub kind: Option<SnapshotKind>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::catalog::Product;

    fn link(product_id: i64, name: &str, category: Option<&str>) -> BuvetteProduct {
        BuvetteProduct {
            buvette_id: 1,
            product_id,
            display_order: product_id as i32,
            default_stock: None,
            product: Product {
                id: product_id,
                name: name.to_string(),
                category: category.map(str::to_string),
                unit: None,
                is_active: true,
            },
        }
    }

    #[test]
    fn sheet_merges_counts_and_defaults() {
        let delta = InventoryDelta {
            id: 40,
            event_id: 2,
            buvette_id: 1,
            product_id: 8,
            initial_qty: Some(24),
            final_qty: None,
            theoretical_sales: None,
            delta: None,
            restock_quantity: Some(6),
            is_restocked: true,
            has_shortage: false,
            shortage_qty: None,
        };
        let sheet = build_sheet(
            2,
            1,
            &[link(3, "Coca 33cl", Some("Softs")), link(8, "Hot-dog", None)],
            &[delta],
        );
        assert_eq!(sheet.products.len(), 2);
        let coca = &sheet.products[0];
        assert_eq!(coca.category, "Softs");
        assert_eq!(coca.unit, "PCE");
        assert_eq!(coca.delta_id, None);
        assert!(!coca.is_restocked);
        let hot_dog = &sheet.products[1];
        assert_eq!(hot_dog.category, "Divers");
        assert_eq!(hot_dog.initial_qty, Some(24));
        assert_eq!(hot_dog.restock_qty, Some(6));
        assert!(hot_dog.is_restocked);
        assert_eq!(hot_dog.delta_id, Some(40));
    }

    #[test]
    fn snapshot_needs_items_and_non_negative_counts() {
        let empty: SnapshotRequest =
            serde_json::from_value(serde_json::json!({"type": "INITIAL", "items": []})).unwrap();
        assert!(empty.into_items().is_err());

        let negative: SnapshotRequest = serde_json::from_value(serde_json::json!({
            "type": "FINAL",
            "items": [{"product_id": 1, "quantity": -3}]
        }))
        .unwrap();
        assert!(negative.into_items().is_err());
    }

    #[test]
    fn snapshot_loss_defaults_to_zero() {
        let req: SnapshotRequest = serde_json::from_value(serde_json::json!({
            "type": "FINAL",
            "items": [{"product_id": 1, "quantity": 4, "declared_sales": 10}]
        }))
        .unwrap();
        let (kind, items) = req.into_items().unwrap();
        assert_eq!(kind, SnapshotKind::Final);
        assert_eq!(items[0].loss, Some(0));
        assert_eq!(items[0].declared_sales, Some(10));
    }
}
