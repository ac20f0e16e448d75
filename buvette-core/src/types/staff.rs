use serde::{Deserialize, Serialize};

use super::catalog::Buvette;

pub const DEFAULT_STAFF_TYPE: &str = "EXTRA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StaffMember {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hourly_rate: Option<f64>,
    pub contract_number: Option<String>,
    pub staff_type: String,
}

impl StaffMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields accepted when creating or replacing a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMemberInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub contract_number: Option<String>,
    #[serde(default)]
    pub staff_type: Option<String>,
}

impl StaffMemberInput {
    pub fn staff_type(&self) -> &str {
        self.staff_type.as_deref().unwrap_or(DEFAULT_STAFF_TYPE)
    }
}

/// A staff member placed at a buvette for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffAssignment {
    pub id: i64,
    pub event_id: i64,
    pub buvette_id: i64,
    pub staff_id: i64,
    pub arrival_time: Option<String>,
    pub slot_index: Option<i32>,
    pub staff: StaffMember,
    pub buvette: Buvette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterKind {
    Staff,
    User,
}

/// One selectable person on the kiosk roster: either a staff member or a
/// back-office user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub original_id: i64,
    #[serde(rename = "type")]
    pub kind: RosterKind,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    pub event_id: i64,
    pub buvette_id: i64,
    pub staff_id: i64,
    pub arrival_time: Option<String>,
    pub slot_index: i32,
}
