use serde::{Deserialize, Serialize};

use crate::types::catalog::ProductOrder;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkProductRequest {
    pub product_id: i64,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub default_stock: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderProductsRequest {
    pub items: Vec<ProductOrder>,
}
