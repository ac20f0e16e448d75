use async_trait::async_trait;

use crate::error::Result;
use crate::types::events::{Event, EventBuvette, EventWithBuvettes, NewEvent};

#[async_trait]
pub trait EventsRepository: Send + Sync {
    /// Most recent first.
    async fn list_events(&self) -> Result<Vec<EventWithBuvettes>>;
    async fn get_event(&self, id: i64) -> Result<Option<Event>>;
    async fn get_event_with_buvettes(&self, id: i64) -> Result<Option<EventWithBuvettes>>;
    async fn find_event_by_name(&self, name: &str) -> Result<Option<Event>>;
    async fn create_event(&self, event: &NewEvent) -> Result<EventWithBuvettes>;

    async fn list_event_buvettes(&self, event_id: i64) -> Result<Vec<EventBuvette>>;
    async fn get_event_buvette(&self, event_id: i64, buvette_id: i64)
    -> Result<Option<EventBuvette>>;
    /// Opens the buvette for the event. A `None` responsable keeps the one
    /// already set.
    async fn link_buvette(
        &self,
        event_id: i64,
        buvette_id: i64,
        responsable_id: Option<i64>,
    ) -> Result<EventBuvette>;
}
