use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Buvette {
    pub id: i64,
    pub name: String,
    pub location_type: Option<String>,
    pub sport: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub is_active: bool,
}

/// A product stocked by a buvette, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuvetteProduct {
    pub buvette_id: i64,
    pub product_id: i64,
    pub display_order: i32,
    pub default_stock: Option<i32>,
    pub product: Product,
}

#[derive(Debug, Clone)]
pub struct NewBuvette {
    pub name: String,
    pub location_type: Option<String>,
    pub sport: String,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOrder {
    pub product_id: i64,
    pub display_order: i32,
}

/// Buvettes whose names collide once whitespace and case are normalised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub normalized_name: String,
    pub buvettes: Vec<BuvetteUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BuvetteUsage {
    pub id: i64,
    pub name: String,
    pub sport: String,
    pub product_count: i64,
}

/// Outcome of removing one buvette during a duplicate cleanup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuvetteRemoval {
    pub buvette_id: i64,
    pub links_removed: u64,
    pub deleted: bool,
}
