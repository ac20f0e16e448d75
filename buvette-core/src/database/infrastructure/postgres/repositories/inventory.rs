use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::database::ports::inventory::InventoryRepository;
use crate::domain::{inventory::closing_lines, status::SnapshotKind};
use crate::error::{CoreError, Result};
use crate::types::{
    catalog::{Buvette, Product},
    inventory::{
        DeltaWithRefs, InventoryDelta, InventoryItem, InventorySnapshot, NewInventoryItem,
        SheetUpdate,
    },
};

const DELTA_COLUMNS: &str = "id, event_id, buvette_id, product_id, initial_qty, final_qty, \
     theoretical_sales, delta, restock_quantity, is_restocked, has_shortage, shortage_qty";
const ITEM_COLUMNS: &str = "id, snapshot_id, product_id, quantity, loss, comment";

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: i64,
    event_id: i64,
    buvette_id: i64,
    #[sqlx(rename = "type", try_from = "String")]
    kind: SnapshotKind,
    created_at: DateTime<Utc>,
}

impl SnapshotRow {
    fn with_items(self, items: Vec<InventoryItem>) -> InventorySnapshot {
        InventorySnapshot {
            id: self.id,
            event_id: self.event_id,
            buvette_id: self.buvette_id,
            kind: self.kind,
            created_at: self.created_at,
            items,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DeltaRefsRow {
    #[sqlx(flatten)]
    delta: InventoryDelta,
    product_name: String,
    category: Option<String>,
    unit: Option<String>,
    product_active: bool,
    buvette_name: String,
    location_type: Option<String>,
    sport: String,
    buvette_active: bool,
}

impl From<DeltaRefsRow> for DeltaWithRefs {
    fn from(row: DeltaRefsRow) -> Self {
        DeltaWithRefs {
            product: Product {
                id: row.delta.product_id,
                name: row.product_name,
                category: row.category,
                unit: row.unit,
                is_active: row.product_active,
            },
            buvette: Buvette {
                id: row.delta.buvette_id,
                name: row.buvette_name,
                location_type: row.location_type,
                sport: row.sport,
                is_active: row.buvette_active,
            },
            delta: row.delta,
        }
    }
}

const DELTA_REFS_SELECT: &str = r#"
    SELECT d.id, d.event_id, d.buvette_id, d.product_id, d.initial_qty, d.final_qty,
           d.theoretical_sales, d.delta, d.restock_quantity, d.is_restocked,
           d.has_shortage, d.shortage_qty,
           p.name AS product_name, p.category, p.unit, p.is_active AS product_active,
           b.name AS buvette_name, b.location_type, b.sport, b.is_active AS buvette_active
    FROM inventory_deltas d
    JOIN products p ON p.id = d.product_id
    JOIN buvettes b ON b.id = d.buvette_id
"#;

/// Names the row a foreign-key violation points at.
fn missing_reference(
    constraint: &str,
    event_id: i64,
    buvette_id: i64,
    product_id: Option<i64>,
) -> String {
    match product_id {
        Some(product_id) if constraint.contains("product") => {
            format!("Unknown product {product_id}")
        }
        _ if constraint.contains("buvette") => format!("Unknown buvette {buvette_id}"),
        _ => format!("Unknown event {event_id}"),
    }
}

#[derive(Clone, Debug)]
pub struct PostgresInventoryRepository {
    pool: PgPool,
}

impl PostgresInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn event_deltas_where(&self, filter: &str, event_id: i64) -> Result<Vec<DeltaWithRefs>> {
        let sql = format!("{DELTA_REFS_SELECT} WHERE d.event_id = $1 {filter} ORDER BY b.name, p.name");
        let rows = sqlx::query_as::<_, DeltaRefsRow>(&sql)
            .bind(event_id)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(DeltaWithRefs::from).collect())
    }
}

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn buvette_deltas(&self, event_id: i64, buvette_id: i64) -> Result<Vec<InventoryDelta>> {
        let sql = format!(
            "SELECT {DELTA_COLUMNS} FROM inventory_deltas WHERE event_id = $1 AND buvette_id = $2"
        );
        Ok(sqlx::query_as::<_, InventoryDelta>(&sql)
            .bind(event_id)
            .bind(buvette_id)
            .fetch_all(self.pool())
            .await?)
    }

    async fn save_sheet(
        &self,
        event_id: i64,
        buvette_id: i64,
        lines: &[SheetUpdate],
    ) -> Result<u64> {
        let mut tx = self.pool().begin().await?;
        let mut written = 0;
        for line in lines {
            written += sqlx::query(
                r#"
                INSERT INTO inventory_deltas
                    (event_id, buvette_id, product_id, initial_qty, final_qty, restock_quantity,
                     is_restocked, has_shortage, shortage_qty)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (event_id, buvette_id, product_id) DO UPDATE
                SET initial_qty = COALESCE(EXCLUDED.initial_qty, inventory_deltas.initial_qty),
                    final_qty = COALESCE(EXCLUDED.final_qty, inventory_deltas.final_qty),
                    restock_quantity = COALESCE(EXCLUDED.restock_quantity, inventory_deltas.restock_quantity),
                    is_restocked = EXCLUDED.is_restocked,
                    has_shortage = EXCLUDED.has_shortage,
                    shortage_qty = COALESCE(EXCLUDED.shortage_qty, inventory_deltas.shortage_qty),
                    updated_at = NOW()
                "#,
            )
            .bind(event_id)
            .bind(buvette_id)
            .bind(line.product_id)
            .bind(line.initial_qty)
            .bind(line.final_qty)
            .bind(line.restock_qty)
            .bind(line.is_restocked.unwrap_or(false))
            .bind(line.has_shortage.unwrap_or(false))
            .bind(line.shortage_qty)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                CoreError::from_reference(e, |constraint| {
                    missing_reference(constraint, event_id, buvette_id, Some(line.product_id))
                })
            })?
            .rows_affected();
        }
        tx.commit().await?;
        info!(event_id, buvette_id, lines = written, "inventory sheet saved");
        Ok(written)
    }

    async fn create_snapshot(
        &self,
        event_id: i64,
        buvette_id: i64,
        kind: SnapshotKind,
        items: &[NewInventoryItem],
    ) -> Result<InventorySnapshot> {
        let mut tx = self.pool().begin().await?;

        let snapshot = sqlx::query_as::<_, SnapshotRow>(
            r#"
            INSERT INTO inventory_snapshots (event_id, buvette_id, type)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, buvette_id, type, created_at
            "#,
        )
        .bind(event_id)
        .bind(buvette_id)
        .bind(kind.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::from_reference(e, |constraint| {
                missing_reference(constraint, event_id, buvette_id, None)
            })
        })?;

        let insert_item = format!(
            r#"
            INSERT INTO inventory_items (snapshot_id, product_id, quantity, loss, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ITEM_COLUMNS}
            "#
        );
        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            let row = sqlx::query_as::<_, InventoryItem>(&insert_item)
                .bind(snapshot.id)
                .bind(item.product_id)
                .bind(item.quantity)
                .bind(item.loss)
                .bind(&item.comment)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    CoreError::from_reference(e, |constraint| {
                        missing_reference(constraint, event_id, buvette_id, Some(item.product_id))
                    })
                })?;
            stored.push(row);
        }

        if kind == SnapshotKind::Final {
            let opening_id: Option<i64> = sqlx::query_scalar(
                r#"
                SELECT id FROM inventory_snapshots
                WHERE event_id = $1 AND buvette_id = $2 AND type = 'INITIAL'
                ORDER BY created_at, id
                LIMIT 1
                "#,
            )
            .bind(event_id)
            .bind(buvette_id)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(opening_id) = opening_id {
                let sql = format!(
                    "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE snapshot_id = $1 ORDER BY id"
                );
                let opening = sqlx::query_as::<_, InventoryItem>(&sql)
                    .bind(opening_id)
                    .fetch_all(&mut *tx)
                    .await?;

                for line in closing_lines(&opening, items) {
                    sqlx::query(
                        r#"
                        INSERT INTO inventory_deltas
                            (event_id, buvette_id, product_id, initial_qty, final_qty,
                             theoretical_sales, delta, restock_quantity)
                        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                        ON CONFLICT (event_id, buvette_id, product_id) DO UPDATE
                        SET initial_qty = EXCLUDED.initial_qty,
                            final_qty = EXCLUDED.final_qty,
                            theoretical_sales = EXCLUDED.theoretical_sales,
                            delta = EXCLUDED.delta,
                            restock_quantity = EXCLUDED.restock_quantity,
                            updated_at = NOW()
                        "#,
                    )
                    .bind(event_id)
                    .bind(buvette_id)
                    .bind(line.product_id)
                    .bind(line.initial_qty)
                    .bind(line.final_qty)
                    .bind(line.stock.theoretical_sales)
                    .bind(line.stock.delta)
                    .bind(line.stock.restock_quantity)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        info!(
            snapshot_id = snapshot.id,
            event_id,
            buvette_id,
            kind = %kind,
            items = stored.len(),
            "inventory snapshot recorded"
        );
        Ok(snapshot.with_items(stored))
    }

    async fn list_snapshots(
        &self,
        event_id: i64,
        buvette_id: i64,
        kind: Option<SnapshotKind>,
    ) -> Result<Vec<InventorySnapshot>> {
        let snapshots = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT id, event_id, buvette_id, type, created_at
            FROM inventory_snapshots
            WHERE event_id = $1 AND buvette_id = $2 AND ($3::TEXT IS NULL OR type = $3)
            ORDER BY created_at, id
            "#,
        )
        .bind(event_id)
        .bind(buvette_id)
        .bind(kind.map(SnapshotKind::as_str))
        .fetch_all(self.pool())
        .await?;

        let ids: Vec<i64> = snapshots.iter().map(|s| s.id).collect();
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE snapshot_id = ANY($1) ORDER BY id"
        );
        let items = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(&ids)
            .fetch_all(self.pool())
            .await?;
        let mut by_snapshot: HashMap<i64, Vec<InventoryItem>> = HashMap::new();
        for item in items {
            by_snapshot.entry(item.snapshot_id).or_default().push(item);
        }

        Ok(snapshots
            .into_iter()
            .map(|s| {
                let items = by_snapshot.remove(&s.id).unwrap_or_default();
                s.with_items(items)
            })
            .collect())
    }

    async fn shortages(&self, event_id: i64) -> Result<Vec<DeltaWithRefs>> {
        self.event_deltas_where("AND d.has_shortage", event_id).await
    }

    async fn event_deltas(&self, event_id: i64) -> Result<Vec<DeltaWithRefs>> {
        self.event_deltas_where("", event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::missing_reference;

    #[test]
    fn constraint_name_selects_the_missing_row() {
        assert_eq!(
            missing_reference("inventory_deltas_product_id_fkey", 1, 2, Some(99)),
            "Unknown product 99"
        );
        assert_eq!(
            missing_reference("inventory_snapshots_buvette_id_fkey", 1, 2, None),
            "Unknown buvette 2"
        );
        assert_eq!(
            missing_reference("inventory_deltas_event_id_fkey", 1, 2, Some(99)),
            "Unknown event 1"
        );
    }
}
