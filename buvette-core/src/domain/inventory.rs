//! Stock arithmetic between the opening and closing counts.

use serde::Serialize;

use crate::types::inventory::{InventoryItem, NewInventoryItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockDelta {
    pub theoretical_sales: i32,
    pub delta: i32,
    pub restock_quantity: i32,
}

/// Derives sales and restock from an opening and a closing count.
///
/// Missing counts are treated as zero. Declared sales default to the
/// theoretical figure so an undeclared item never shows a discrepancy.
pub fn compute_delta(
    initial: Option<i32>,
    final_qty: Option<i32>,
    declared_sales: Option<i32>,
) -> StockDelta {
    let consumed = (initial.unwrap_or(0) - final_qty.unwrap_or(0)).max(0);
    let declared = declared_sales.unwrap_or(consumed);
    StockDelta {
        theoretical_sales: consumed,
        delta: declared - consumed,
        restock_quantity: consumed,
    }
}

/// Delta row derived for one product of a closing count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosingLine {
    pub product_id: i64,
    pub initial_qty: Option<i32>,
    pub final_qty: i32,
    pub stock: StockDelta,
}

/// Pairs each closing item with the opening count of the same product.
pub fn closing_lines(opening: &[InventoryItem], closing: &[NewInventoryItem]) -> Vec<ClosingLine> {
    closing
        .iter()
        .map(|item| {
            let initial_qty = opening
                .iter()
                .find(|o| o.product_id == item.product_id)
                .map(|o| o.quantity);
            ClosingLine {
                product_id: item.product_id,
                initial_qty,
                final_qty: item.quantity,
                stock: compute_delta(initial_qty, Some(item.quantity), item.declared_sales),
            }
        })
        .collect()
}
