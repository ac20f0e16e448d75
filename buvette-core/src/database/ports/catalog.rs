use async_trait::async_trait;

use crate::error::Result;
use crate::types::catalog::{
    Buvette, BuvetteProduct, BuvetteRemoval, BuvetteUsage, NewBuvette, NewProduct, Product,
    ProductOrder,
};

// Buvettes, products and which products each buvette stocks
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_active_buvettes(&self) -> Result<Vec<Buvette>>;
    async fn list_buvettes_by_sport(&self, sport: &str) -> Result<Vec<Buvette>>;
    async fn list_all_buvettes(&self) -> Result<Vec<Buvette>>;
    async fn get_buvette(&self, id: i64) -> Result<Option<Buvette>>;
    async fn create_buvette(&self, buvette: &NewBuvette) -> Result<Buvette>;

    async fn list_active_products(&self) -> Result<Vec<Product>>;
    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>>;
    async fn create_product(&self, product: &NewProduct) -> Result<Product>;

    async fn list_buvette_products(&self, buvette_id: i64) -> Result<Vec<BuvetteProduct>>;
    async fn upsert_buvette_product(
        &self,
        buvette_id: i64,
        product_id: i64,
        display_order: Option<i32>,
        default_stock: Option<i32>,
    ) -> Result<BuvetteProduct>;
    /// Returns false when the buvette did not stock the product.
    async fn remove_buvette_product(&self, buvette_id: i64, product_id: i64) -> Result<bool>;
    /// Applies every new position or none of them.
    async fn reorder_buvette_products(&self, buvette_id: i64, order: &[ProductOrder])
    -> Result<()>;

    /// Every buvette with its number of stocked products.
    async fn buvette_usage(&self) -> Result<Vec<BuvetteUsage>>;
    async fn remove_buvettes(&self, ids: &[i64]) -> Result<Vec<BuvetteRemoval>>;
}
