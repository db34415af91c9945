use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the `events` table.
///
/// A row is either a standalone event, the head of a recurring series
/// (`recurring = true`, `parent_id = None`) or a generated session of a
/// series (`parent_id = Some(head)`). Standalone events and generated
/// sessions are the check-in targets; a series head only carries the
/// definition, the threshold and the membership list.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub location: String,
    pub notes: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub checkin_open_minutes: i32,
    pub checkin_token: String,
    pub organizer_id: String,
    pub parent_id: Option<String>,
    pub recurring: bool,
    pub weekdays: Option<Json<Vec<Weekday>>>,
    pub recurring_until: Option<NaiveDate>,
    pub attendance_threshold: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEventParams {
    pub name: String,
    pub location: String,
    pub notes: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub checkin_open_minutes: i32,
    pub checkin_token: String,
    pub organizer_id: String,
}

impl Event {
    pub fn new(params: NewEventParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            location: params.location,
            notes: params.notes,
            start_time: params.start_time,
            end_time: params.end_time,
            timezone: params.timezone,
            checkin_open_minutes: params.checkin_open_minutes,
            checkin_token: params.checkin_token,
            organizer_id: params.organizer_id,
            parent_id: None,
            recurring: false,
            weekdays: None,
            recurring_until: None,
            attendance_threshold: None,
            created_at: Utc::now(),
        }
    }

    /// Builds a generated session of `head` at the given instants.
    pub fn child_of(head: &Event, start_time: DateTime<Utc>, end_time: DateTime<Utc>, checkin_token: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: head.name.clone(),
            location: head.location.clone(),
            notes: head.notes.clone(),
            start_time,
            end_time,
            timezone: head.timezone.clone(),
            checkin_open_minutes: head.checkin_open_minutes,
            checkin_token,
            organizer_id: head.organizer_id.clone(),
            parent_id: Some(head.id.clone()),
            recurring: false,
            weekdays: None,
            recurring_until: None,
            attendance_threshold: None,
            created_at: head.created_at,
        }
    }

    pub fn is_series_head(&self) -> bool {
        self.recurring && self.parent_id.is_none()
    }

    /// Standalone events and generated sessions accept check-ins.
    pub fn is_session(&self) -> bool {
        !self.is_series_head()
    }

    pub fn checkin_opens_at(&self) -> DateTime<Utc> {
        self.start_time - Duration::minutes(self.checkin_open_minutes as i64)
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EventMember {
    pub event_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl EventMember {
    pub fn new(event_id: String, user_id: String) -> Self {
        Self {
            event_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}
