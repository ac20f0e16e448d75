use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::database::ports::catalog::CatalogRepository;
use crate::error::{CoreError, Result};
use crate::types::catalog::{
    Buvette, BuvetteProduct, BuvetteRemoval, BuvetteUsage, NewBuvette, NewProduct, Product,
    ProductOrder,
};

const BUVETTE_COLUMNS: &str = "id, name, location_type, sport, is_active";
const PRODUCT_COLUMNS: &str = "id, name, category, unit, is_active";

#[derive(sqlx::FromRow)]
struct LinkRow {
    buvette_id: i64,
    product_id: i64,
    display_order: i32,
    default_stock: Option<i32>,
    name: String,
    category: Option<String>,
    unit: Option<String>,
    is_active: bool,
}

impl From<LinkRow> for BuvetteProduct {
    fn from(row: LinkRow) -> Self {
        BuvetteProduct {
            buvette_id: row.buvette_id,
            product_id: row.product_id,
            display_order: row.display_order,
            default_stock: row.default_stock,
            product: Product {
                id: row.product_id,
                name: row.name,
                category: row.category,
                unit: row.unit,
                is_active: row.is_active,
            },
        }
    }
}

const LINK_SELECT: &str = r#"
    SELECT bp.buvette_id, bp.product_id, bp.display_order, bp.default_stock,
           p.name, p.category, p.unit, p.is_active
    FROM buvette_products bp
    JOIN products p ON p.id = bp.product_id
"#;

#[derive(Clone, Debug)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_active_buvettes(&self) -> Result<Vec<Buvette>> {
        let sql = format!("SELECT {BUVETTE_COLUMNS} FROM buvettes WHERE is_active ORDER BY name");
        Ok(sqlx::query_as::<_, Buvette>(&sql)
            .fetch_all(self.pool())
            .await?)
    }

    async fn list_buvettes_by_sport(&self, sport: &str) -> Result<Vec<Buvette>> {
        let sql = format!(
            "SELECT {BUVETTE_COLUMNS} FROM buvettes WHERE is_active AND sport = $1 ORDER BY name"
        );
        Ok(sqlx::query_as::<_, Buvette>(&sql)
            .bind(sport.trim().to_uppercase())
            .fetch_all(self.pool())
            .await?)
    }

    async fn list_all_buvettes(&self) -> Result<Vec<Buvette>> {
        let sql = format!("SELECT {BUVETTE_COLUMNS} FROM buvettes ORDER BY id");
        Ok(sqlx::query_as::<_, Buvette>(&sql)
            .fetch_all(self.pool())
            .await?)
    }

    async fn get_buvette(&self, id: i64) -> Result<Option<Buvette>> {
        let sql = format!("SELECT {BUVETTE_COLUMNS} FROM buvettes WHERE id = $1");
        Ok(sqlx::query_as::<_, Buvette>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?)
    }

    async fn create_buvette(&self, buvette: &NewBuvette) -> Result<Buvette> {
        let sql = format!(
            "INSERT INTO buvettes (name, location_type, sport) VALUES ($1, $2, $3) RETURNING {BUVETTE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Buvette>(&sql)
            .bind(&buvette.name)
            .bind(&buvette.location_type)
            .bind(&buvette.sport)
            .fetch_one(self.pool())
            .await?;
        info!(buvette_id = created.id, name = %created.name, "created buvette");
        Ok(created)
    }

    async fn list_active_products(&self) -> Result<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active ORDER BY name");
        Ok(sqlx::query_as::<_, Product>(&sql)
            .fetch_all(self.pool())
            .await?)
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE name = $1 ORDER BY id LIMIT 1");
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(name)
            .fetch_optional(self.pool())
            .await?)
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let sql = format!(
            "INSERT INTO products (name, category, unit) VALUES ($1, $2, $3) RETURNING {PRODUCT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.unit)
            .fetch_one(self.pool())
            .await?)
    }

    async fn list_buvette_products(&self, buvette_id: i64) -> Result<Vec<BuvetteProduct>> {
        let sql = format!("{LINK_SELECT} WHERE bp.buvette_id = $1 ORDER BY bp.display_order, p.name");
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(buvette_id)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(BuvetteProduct::from).collect())
    }

    async fn upsert_buvette_product(
        &self,
        buvette_id: i64,
        product_id: i64,
        display_order: Option<i32>,
        default_stock: Option<i32>,
    ) -> Result<BuvetteProduct> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            WITH link AS (
                INSERT INTO buvette_products (buvette_id, product_id, display_order, default_stock)
                VALUES ($1, $2, COALESCE($3, 0), $4)
                ON CONFLICT (buvette_id, product_id) DO UPDATE
                SET display_order = COALESCE($3, buvette_products.display_order),
                    default_stock = COALESCE($4, buvette_products.default_stock)
                RETURNING buvette_id, product_id, display_order, default_stock
            )
            SELECT bp.buvette_id, bp.product_id, bp.display_order, bp.default_stock,
                   p.name, p.category, p.unit, p.is_active
            FROM link bp
            JOIN products p ON p.id = bp.product_id
            "#,
        )
        .bind(buvette_id)
        .bind(product_id)
        .bind(display_order)
        .bind(default_stock)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            if e
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation())
            {
                CoreError::not_found(format!("Buvette {buvette_id} or product {product_id} not found"))
            } else {
                CoreError::Database(e)
            }
        })?;
        row.map(BuvetteProduct::from)
            .ok_or_else(|| CoreError::not_found(format!("Product {product_id} not found")))
    }

    async fn remove_buvette_product(&self, buvette_id: i64, product_id: i64) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM buvette_products WHERE buvette_id = $1 AND product_id = $2")
                .bind(buvette_id)
                .bind(product_id)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder_buvette_products(
        &self,
        buvette_id: i64,
        order: &[ProductOrder],
    ) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        for item in order {
            let result = sqlx::query(
                "UPDATE buvette_products SET display_order = $3 WHERE buvette_id = $1 AND product_id = $2",
            )
            .bind(buvette_id)
            .bind(item.product_id)
            .bind(item.display_order)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back the positions already written.
                return Err(CoreError::not_found(format!(
                    "Product {} is not stocked by buvette {buvette_id}",
                    item.product_id
                )));
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn buvette_usage(&self) -> Result<Vec<BuvetteUsage>> {
        Ok(sqlx::query_as::<_, BuvetteUsage>(
            r#"
            SELECT b.id, b.name, b.sport, COUNT(bp.product_id) AS product_count
            FROM buvettes b
            LEFT JOIN buvette_products bp ON bp.buvette_id = b.id
            GROUP BY b.id
            ORDER BY b.name, b.id
            "#,
        )
        .fetch_all(self.pool())
        .await?)
    }

    async fn remove_buvettes(&self, ids: &[i64]) -> Result<Vec<BuvetteRemoval>> {
        let mut removals = Vec::with_capacity(ids.len());
        for &id in ids {
            let mut tx = self.pool().begin().await?;
            let links = sqlx::query("DELETE FROM buvette_products WHERE buvette_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            let deleted = sqlx::query("DELETE FROM buvettes WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected()
                > 0;
            tx.commit().await?;
            info!(buvette_id = id, links_removed = links, deleted, "removed buvette");
            removals.push(BuvetteRemoval {
                buvette_id: id,
                links_removed: links,
                deleted,
            });
        }
        Ok(removals)
    }
}
