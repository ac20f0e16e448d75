use async_trait::async_trait;

use crate::domain::status::WorkflowStatus;
use crate::error::Result;
use crate::types::timesheets::{NewShift, Shift, Timesheet, TimesheetDetails, TimesheetReport};

#[async_trait]
pub trait TimesheetsRepository: Send + Sync {
    async fn list_for_event(&self, event_id: i64) -> Result<Vec<TimesheetDetails>>;
    async fn find_for_buvette(
        &self,
        event_id: i64,
        buvette_id: i64,
    ) -> Result<Option<TimesheetDetails>>;
    async fn get_timesheet(&self, id: i64) -> Result<Option<TimesheetDetails>>;

    /// Creates or reuses the buvette's timesheet, marks it submitted and
    /// replaces its shifts.
    async fn submit_from_kiosk(
        &self,
        event_id: i64,
        buvette_id: i64,
        responsable_id: Option<i64>,
        shifts: &[NewShift],
    ) -> Result<TimesheetDetails>;
    /// Conflict when the buvette already has a timesheet for the event.
    async fn create_draft(
        &self,
        event_id: i64,
        buvette_id: i64,
        responsable_id: i64,
        shifts: &[NewShift],
    ) -> Result<TimesheetDetails>;
    /// Replaces every shift and puts the timesheet back to draft. Fails with
    /// `Validation` once the timesheet is validated.
    async fn replace_shifts(&self, id: i64, shifts: &[NewShift]) -> Result<TimesheetDetails>;
    async fn add_shift(&self, timesheet_id: i64, shift: &NewShift) -> Result<Option<Shift>>;

    async fn set_status(
        &self,
        id: i64,
        status: WorkflowStatus,
        validated_by: Option<i64>,
    ) -> Result<Option<Timesheet>>;

    /// Timesheets of the event with buvette and staff resolved.
    async fn reports_for_event(&self, event_id: i64) -> Result<Vec<TimesheetReport>>;
}
