use serde::{Deserialize, Serialize};

use crate::types::checklists::ChecklistAnswer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillChecklistRequest {
    pub items: Vec<ChecklistAnswer>,
}
