use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    hours::{MAX_BREAK_MINUTES, shift_window},
    validation::{ValidationError, require_text},
};
use crate::error::Result;
use crate::types::timesheets::NewShift;

fn check_shift_fields(position: &str, break_minutes: i32) -> std::result::Result<(), ValidationError> {
    require_text("position", position)?;
    if !(0..=MAX_BREAK_MINUTES).contains(&break_minutes) {
        return Err(ValidationError::OutOfRange {
            field: "break_minutes",
            min: 0,
            max: i64::from(MAX_BREAK_MINUTES),
        });
    }
    Ok(())
}

/// A shift entered on the kiosk, with wall-clock times on the event day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskShift {
    pub staff_id: i64,
    pub position: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`; earlier than `start_time` means the shift ended after midnight.
    pub end_time: String,
    #[serde(default)]
    pub break_minutes: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl KioskShift {
    pub fn into_new_shift(self, event_date: DateTime<Utc>) -> Result<NewShift> {
        check_shift_fields(&self.position, self.break_minutes)?;
        let (start, end) = shift_window(event_date, &self.start_time, &self.end_time)?;
        Ok(NewShift::new(
            self.staff_id,
            self.position,
            start,
            end,
            self.break_minutes,
            self.notes,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskSubmission {
    pub buvette_id: i64,
    #[serde(default)]
    pub shifts: Vec<KioskShift>,
}

/// A shift entered from the back office with full timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftInput {
    pub staff_id: i64,
    pub position: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub break_minutes: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ShiftInput {
    pub fn into_new_shift(self) -> std::result::Result<NewShift, ValidationError> {
        check_shift_fields(&self.position, self.break_minutes)?;
        if self.end_time < self.start_time {
            return Err(ValidationError::Invalid(
                "end_time must not be before start_time".to_string(),
            ));
        }
        Ok(NewShift::new(
            self.staff_id,
            self.position,
            self.start_time,
            self.end_time,
            self.break_minutes,
            self.notes,
        ))
    }
}

pub fn into_new_shifts(inputs: Vec<ShiftInput>) -> std::result::Result<Vec<NewShift>, ValidationError> {
    inputs.into_iter().map(ShiftInput::into_new_shift).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftTimesheetRequest {
    pub buvette_id: i64,
    pub responsable_id: i64,
    #[serde(default)]
    pub shifts: Vec<ShiftInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceShiftsRequest {
    pub shifts: Vec<ShiftInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuvetteQuery {
    #[serde(default)]
    pub buvette_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kiosk_shift_is_anchored_on_event_day() {
        let shift: KioskShift = serde_json::from_value(serde_json::json!({
            "staff_id": 4,
            "position": "Caisse",
            "start_time": "18:00",
            "end_time": "00:30",
            "break_minutes": 30
        }))
        .unwrap();
        let event_date = Utc.with_ymd_and_hms(2025, 11, 2, 19, 0, 0).unwrap();
        let shift = shift.into_new_shift(event_date).unwrap();
        assert_eq!(shift.start_time, Utc.with_ymd_and_hms(2025, 11, 2, 18, 0, 0).unwrap());
        assert_eq!(shift.end_time, Utc.with_ymd_and_hms(2025, 11, 3, 0, 30, 0).unwrap());
        assert_eq!(shift.hours_worked, 6.0);
    }

    #[test]
    fn kiosk_shift_rejects_long_breaks() {
        let shift = KioskShift {
            staff_id: 1,
            position: "Bar".to_string(),
            start_time: "18:00".to_string(),
            end_time: "23:00".to_string(),
            break_minutes: 300,
            notes: None,
        };
        assert!(shift.into_new_shift(Utc::now()).is_err());
    }

    #[test]
    fn back_office_shift_requires_ordered_times() {
        let input = ShiftInput {
            staff_id: 1,
            position: "Bar".to_string(),
            start_time: Utc.with_ymd_and_hms(2025, 1, 1, 20, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 1, 1, 18, 0, 0).unwrap(),
            break_minutes: 0,
            notes: Some(String::new()),
        };
        assert!(input.into_new_shift().is_err());
    }

    #[test]
    fn empty_notes_are_dropped() {
        let input = ShiftInput {
            staff_id: 1,
            position: "Bar".to_string(),
            start_time: Utc.with_ymd_and_hms(2025, 1, 1, 18, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 1, 1, 21, 30, 0).unwrap(),
            break_minutes: 15,
            notes: Some(String::new()),
        };
        let shift = input.into_new_shift().unwrap();
        assert_eq!(shift.notes, None);
        assert_eq!(shift.hours_worked, 3.25);
    }
}
