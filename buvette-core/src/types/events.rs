use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{catalog::Buvette, users::UserSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    pub venue: Option<String>,
    pub sport: Option<String>,
    pub opening_time: Option<DateTime<Utc>>,
    pub match_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// A buvette opened for an event, with the responsable running it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBuvette {
    pub id: i64,
    pub event_id: i64,
    pub buvette_id: i64,
    pub responsable_id: Option<i64>,
    pub buvette: Buvette,
    pub responsable: Option<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWithBuvettes {
    #[serde(flatten)]
    pub event: Event,
    pub buvettes: Vec<EventBuvette>,
}

#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub name: String,
    pub date: DateTime<Utc>,
    pub venue: Option<String>,
    pub sport: Option<String>,
    pub opening_time: Option<DateTime<Utc>>,
    pub match_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub buvette_ids: Vec<i64>,
}
