use crate::domain::models::user::Role;
use crate::domain::services::event_service::EventDraft;
use serde::Deserialize;

/// `start_time`/`end_time` are `datetime-local` values in `timezone`, or
/// RFC 3339 with an explicit offset.
#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub notes: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub timezone: Option<String>,
    pub checkin_open_minutes: Option<i32>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub weekdays: Vec<String>,
    pub end_date: Option<String>,
    pub attendance_threshold: Option<i32>,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

impl From<CreateEventRequest> for EventDraft {
    fn from(req: CreateEventRequest) -> Self {
        EventDraft {
            name: req.name,
            location: req.location,
            notes: req.notes,
            start_time: req.start_time,
            end_time: req.end_time,
            timezone: req.timezone,
            checkin_open_minutes: req.checkin_open_minutes,
            recurring: req.recurring,
            weekdays: req.weekdays,
            end_date: req.end_date,
            attendance_threshold: req.attendance_threshold,
            member_ids: req.member_ids,
        }
    }
}

#[derive(Deserialize)]
pub struct CheckInRequest {
    pub event_token: String,
}

#[derive(Deserialize)]
pub struct SummaryQuery {
    pub member_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Deserialize)]
pub struct GrantRoleRequest {
    pub role: Role,
}
