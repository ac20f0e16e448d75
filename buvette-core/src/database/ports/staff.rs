use async_trait::async_trait;

use crate::error::Result;
use crate::types::staff::{NewAssignment, StaffAssignment, StaffMember, StaffMemberInput};

#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn list_staff(&self) -> Result<Vec<StaffMember>>;
    async fn get_staff(&self, id: i64) -> Result<Option<StaffMember>>;
    async fn find_staff_by_email(&self, email: &str) -> Result<Option<StaffMember>>;
    async fn create_staff(&self, input: &StaffMemberInput) -> Result<StaffMember>;
    async fn create_staff_batch(&self, inputs: &[StaffMemberInput]) -> Result<u64>;
    async fn update_staff(&self, id: i64, input: &StaffMemberInput)
    -> Result<Option<StaffMember>>;
    /// Drops the member's assignments with it. False when absent.
    async fn delete_staff(&self, id: i64) -> Result<bool>;

    async fn list_assignments(&self, event_id: i64) -> Result<Vec<StaffAssignment>>;
    async fn list_buvette_assignments(
        &self,
        event_id: i64,
        buvette_id: i64,
    ) -> Result<Vec<StaffAssignment>>;
    async fn find_event_assignment(
        &self,
        event_id: i64,
        staff_id: i64,
    ) -> Result<Option<StaffAssignment>>;
    async fn count_buvette_assignments(&self, event_id: i64, buvette_id: i64) -> Result<i64>;
    async fn create_assignment(&self, assignment: &NewAssignment) -> Result<StaffAssignment>;
    async fn update_arrival_time(
        &self,
        event_id: i64,
        buvette_id: i64,
        staff_id: i64,
        arrival_time: Option<&str>,
    ) -> Result<Option<StaffAssignment>>;
    async fn delete_assignment(&self, event_id: i64, buvette_id: i64, staff_id: i64)
    -> Result<bool>;
}
