use async_trait::async_trait;

use crate::domain::status::WorkflowStatus;
use crate::error::Result;
use crate::types::checklists::{
    ChecklistAnswer, ChecklistReport, ChecklistResponse, ChecklistTemplate,
};

#[async_trait]
pub trait ChecklistsRepository: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<ChecklistTemplate>>;
    async fn get_template(&self, id: i64) -> Result<Option<ChecklistTemplate>>;
    /// Creates the template with its items unless one already has this name.
    async fn ensure_template(
        &self,
        name: &str,
        description: Option<&str>,
        labels: &[&str],
    ) -> Result<ChecklistTemplate>;

    async fn create_response(
        &self,
        event_id: i64,
        buvette_id: i64,
        template_id: i64,
        answers: &[ChecklistAnswer],
    ) -> Result<ChecklistResponse>;
    async fn get_response(&self, id: i64) -> Result<Option<ChecklistResponse>>;
    async fn set_response_status(
        &self,
        id: i64,
        status: WorkflowStatus,
    ) -> Result<Option<ChecklistResponse>>;

    async fn reports_for_event(&self, event_id: i64) -> Result<Vec<ChecklistReport>>;
}
