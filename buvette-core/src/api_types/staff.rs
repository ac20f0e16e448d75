use serde::{Deserialize, Serialize};

use crate::domain::validation::{ValidationError, is_plausible_email, require_text};
use crate::types::staff::StaffMemberInput;

impl StaffMemberInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty())
            && !is_plausible_email(email)
        {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
        if let Some(rate) = self.hourly_rate
            && rate < 0.0
        {
            return Err(ValidationError::Negative { field: "hourly_rate" });
        }
        Ok(())
    }
}

/// Narrows the roster to the staff planned at one buvette.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterQuery {
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub buvette_id: Option<i64>,
}

impl RosterQuery {
    pub fn assignment_filter(&self) -> Option<(i64, i64)> {
        self.event_id.zip(self.buvette_id)
    }
}
