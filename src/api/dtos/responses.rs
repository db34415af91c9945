use crate::domain::models::{attendance::Attendance, event::Event};
use serde::Serialize;

#[derive(Serialize)]
pub struct CreatedEventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub sessions: Vec<Event>,
}

#[derive(Serialize)]
pub struct CheckInResponse {
    #[serde(flatten)]
    pub attendance: Attendance,
    pub event_name: String,
}

/// Public view of an event resolved from a check-in token; the token
/// itself is not echoed back.
#[derive(Serialize)]
pub struct TokenEventResponse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub timezone: String,
    pub checkin_opens_at: chrono::DateTime<chrono::Utc>,
    pub parent_id: Option<String>,
    pub attendance_count: i64,
}

impl TokenEventResponse {
    pub fn new(event: &Event, attendance_count: i64) -> Self {
        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            location: event.location.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            timezone: event.timezone.clone(),
            checkin_opens_at: event.checkin_opens_at(),
            parent_id: event.parent_id.clone(),
            attendance_count,
        }
    }
}
