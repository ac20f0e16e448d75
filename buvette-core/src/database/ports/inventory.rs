use async_trait::async_trait;

use crate::domain::status::SnapshotKind;
use crate::error::Result;
use crate::types::inventory::{
    DeltaWithRefs, InventoryDelta, InventorySnapshot, NewInventoryItem, SheetUpdate,
};

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn buvette_deltas(&self, event_id: i64, buvette_id: i64) -> Result<Vec<InventoryDelta>>;
    /// Upserts every sheet line in one transaction and returns how many were
    /// written.
    async fn save_sheet(&self, event_id: i64, buvette_id: i64, lines: &[SheetUpdate])
    -> Result<u64>;

    /// Stores a count. A final count taken after an initial one also
    /// refreshes the deltas of the counted products.
    async fn create_snapshot(
        &self,
        event_id: i64,
        buvette_id: i64,
        kind: SnapshotKind,
        items: &[NewInventoryItem],
    ) -> Result<InventorySnapshot>;
    async fn list_snapshots(
        &self,
        event_id: i64,
        buvette_id: i64,
        kind: Option<SnapshotKind>,
    ) -> Result<Vec<InventorySnapshot>>;

    async fn shortages(&self, event_id: i64) -> Result<Vec<DeltaWithRefs>>;
    async fn event_deltas(&self, event_id: i64) -> Result<Vec<DeltaWithRefs>>;
}
