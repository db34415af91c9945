use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A recorded check-in. At most one per `(event_id, attendee_id)`.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Attendance {
    pub id: String,
    pub event_id: String,
    pub attendee_id: String,
    pub checked_in_at: DateTime<Utc>,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl Attendance {
    pub fn new(
        event_id: String,
        attendee_id: String,
        checked_in_at: DateTime<Utc>,
        source_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            attendee_id,
            checked_in_at,
            source_ip,
            user_agent,
        }
    }
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct RosterEntry {
    pub attendance_id: String,
    pub attendee_id: String,
    pub name: String,
    pub email: String,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct CheckInHistoryEntry {
    pub id: String,
    pub event_id: String,
    pub checked_in_at: DateTime<Utc>,
    pub event_name: String,
    pub event_location: String,
    pub event_start_time: DateTime<Utc>,
}
