//! Worked-hours arithmetic for shifts.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::error::{CoreError, Result};

/// Longest break a single shift may record.
pub const MAX_BREAK_MINUTES: i32 = 240;

/// Hours between `start` and `end` minus the break, rounded to cents of an hour.
pub fn compute_hours(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    break_minutes: i32,
) -> f64 {
    let elapsed = (end - start).num_milliseconds() as f64 / 3_600_000.0;
    round_hours(elapsed - f64::from(break_minutes) / 60.0)
}

pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

pub fn validate_break(break_minutes: i32) -> Result<()> {
    if !(0..=MAX_BREAK_MINUTES).contains(&break_minutes) {
        return Err(CoreError::validation(format!(
            "break_minutes must be between 0 and {MAX_BREAK_MINUTES}"
        )));
    }
    Ok(())
}

/// Parses a wall-clock time written as `HH:MM`.
pub fn parse_clock(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| CoreError::validation(format!("invalid time '{raw}', expected HH:MM")))
}

/// Anchors kiosk clock times on the event's UTC calendar day.
///
/// An end time earlier than the start is an overnight shift and lands on the
/// following day.
pub fn shift_window(
    event_date: DateTime<Utc>,
    start: &str,
    end: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let day = event_date.date_naive();
    let start_at = day.and_time(parse_clock(start)?).and_utc();
    let mut end_at = day.and_time(parse_clock(end)?).and_utc();
    if end_at < start_at {
        end_at += Duration::days(1);
    }
    Ok((start_at, end_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, 0).unwrap()
    }

    #[test]
    fn hours_subtract_break() {
        assert_eq!(compute_hours(at(17, 30), at(23, 0), 30), 5.0);
        assert_eq!(compute_hours(at(18, 0), at(22, 20), 0), 4.33);
    }

    #[test]
    fn hours_round_to_two_decimals() {
        assert_eq!(compute_hours(at(18, 0), at(18, 10), 0), 0.17);
        assert_eq!(round_hours(2.005_1), 2.01);
    }

    #[test]
    fn break_bounds() {
        assert!(validate_break(0).is_ok());
        assert!(validate_break(240).is_ok());
        assert!(validate_break(241).is_err());
        assert!(validate_break(-1).is_err());
    }

    #[test]
    fn window_uses_event_day() {
        let event = Utc.with_ymd_and_hms(2025, 3, 14, 19, 45, 0).unwrap();
        let (start, end) = shift_window(event, "17:30", "23:15").unwrap();
        assert_eq!(start, at(17, 30));
        assert_eq!(end, at(23, 15));
    }

    #[test]
    fn overnight_shift_rolls_to_next_day() {
        let event = Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap();
        let (start, end) = shift_window(event, "22:00", "01:30").unwrap();
        assert_eq!(start, at(22, 0));
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 15, 1, 30, 0).unwrap());
        assert_eq!(compute_hours(start, end, 15), 3.25);
    }

    #[test]
    fn malformed_clock_is_rejected() {
        let event = at(0, 0);
        assert!(shift_window(event, "25:00", "23:00").is_err());
        assert!(shift_window(event, "17h30", "23:00").is_err());
    }
}
