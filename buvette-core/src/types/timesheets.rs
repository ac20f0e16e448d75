use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{catalog::Buvette, events::Event, staff::StaffMember};
use crate::domain::{hours::compute_hours, status::WorkflowStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Timesheet {
    pub id: i64,
    pub event_id: i64,
    pub buvette_id: i64,
    pub responsable_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: WorkflowStatus,
    pub validated_by_id: Option<i64>,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Shift {
    pub id: i64,
    pub timesheet_id: i64,
    pub staff_id: i64,
    pub position: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub break_minutes: i32,
    pub hours_worked: f64,
    pub notes: Option<String>,
}

/// A shift ready to be written, with its hours already computed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShift {
    pub staff_id: i64,
    pub position: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub break_minutes: i32,
    pub hours_worked: f64,
    pub notes: Option<String>,
}

impl NewShift {
    pub fn new(
        staff_id: i64,
        position: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        break_minutes: i32,
        notes: Option<String>,
    ) -> Self {
        Self {
            staff_id,
            position,
            start_time,
            end_time,
            break_minutes,
            hours_worked: compute_hours(start_time, end_time, break_minutes),
            notes: notes.filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetDetails {
    #[serde(flatten)]
    pub timesheet: Timesheet,
    pub shifts: Vec<Shift>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buvette: Option<Buvette>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
}

/// A shift together with the staff member it was recorded for, when known.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffedShift {
    pub shift: Shift,
    pub staff: Option<StaffMember>,
}

impl StaffedShift {
    pub fn staff_name(&self) -> String {
        match &self.staff {
            Some(staff) => staff.full_name(),
            None => format!("Staff #{}", self.shift.staff_id),
        }
    }
}

/// Everything recorded for one buvette's timesheet, used by reports.
#[derive(Debug, Clone, PartialEq)]
pub struct TimesheetReport {
    pub timesheet: Timesheet,
    pub buvette: Buvette,
    pub shifts: Vec<StaffedShift>,
}
