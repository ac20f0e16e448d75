use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Buvette;
use crate::domain::status::WorkflowStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistTemplate {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChecklistItem {
    pub id: i64,
    pub template_id: i64,
    pub label: String,
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistResponse {
    pub id: i64,
    pub event_id: i64,
    pub buvette_id: i64,
    pub template_id: i64,
    pub status: WorkflowStatus,
    pub filled_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
    pub items: Vec<ChecklistResponseItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<ChecklistTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChecklistResponseItem {
    pub id: i64,
    pub response_id: i64,
    pub item_id: i64,
    pub value: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistAnswer {
    pub item_id: i64,
    pub value: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A filled checklist with the names needed by the event summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistReport {
    pub response: ChecklistResponse,
    pub template_name: String,
    pub buvette: Buvette,
}
