use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    hours::parse_clock,
    validation::{ValidationError, require_text},
};
use crate::types::events::NewEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub opening_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub match_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub buvette_ids: Vec<i64>,
}

impl CreateEventRequest {
    pub fn into_new_event(self) -> Result<NewEvent, ValidationError> {
        require_text("name", &self.name)?;
        Ok(NewEvent {
            name: self.name.trim().to_string(),
            date: self.date,
            venue: self.venue,
            sport: self.sport.map(|s| s.trim().to_uppercase()),
            opening_time: self.opening_time,
            match_time: self.match_time,
            notes: self.notes,
            buvette_ids: self.buvette_ids,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkBuvetteRequest {
    pub buvette_id: i64,
    pub responsable_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignStaffRequest {
    #[serde(default)]
    pub staff_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArrivalTimeRequest {
    #[serde(default)]
    pub arrival_time: Option<String>,
}

impl ArrivalTimeRequest {
    /// An empty value clears the arrival time.
    pub fn normalized(&self) -> Result<Option<String>, ValidationError> {
        match self.arrival_time.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_clock(raw)
                .map(|t| Some(t.format("%H:%M").to_string()))
                .map_err(|_| ValidationError::Invalid(format!("invalid arrival time '{raw}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sport_is_upper_cased() {
        let req: CreateEventRequest = serde_json::from_value(serde_json::json!({
            "name": "Servette FC vs FC Bâle",
            "date": "2026-02-12T18:00:00Z",
            "sport": "foot",
            "buvette_ids": [1, 2]
        }))
        .unwrap();
        let event = req.into_new_event().unwrap();
        assert_eq!(event.sport.as_deref(), Some("FOOT"));
        assert_eq!(event.buvette_ids, [1, 2]);
    }

    #[test]
    fn blank_name_is_rejected() {
        let req: CreateEventRequest = serde_json::from_value(serde_json::json!({
            "name": " ",
            "date": "2026-02-12T18:00:00Z"
        }))
        .unwrap();
        assert!(req.into_new_event().is_err());
    }

    #[test]
    fn arrival_time_normalisation() {
        let req = |v: Option<&str>| ArrivalTimeRequest { arrival_time: v.map(str::to_string) };
        assert_eq!(req(Some("9:05")).normalized().unwrap().as_deref(), Some("09:05"));
        assert_eq!(req(Some("")).normalized().unwrap(), None);
        assert_eq!(req(None).normalized().unwrap(), None);
        assert!(req(Some("late")).normalized().is_err());
    }
}
