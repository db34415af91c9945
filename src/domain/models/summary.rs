use serde::Serialize;
use chrono::{DateTime, Utc};
use crate::domain::models::event::Event;

/// Slim projection of a session used by summaries and dashboards.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SessionView {
    pub id: String,
    pub name: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&Event> for SessionView {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            location: event.location.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PastSession {
    #[serde(flatten)]
    pub session: SessionView,
    pub attended: bool,
}

/// Per-member attendance projection of one series at one instant.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AttendanceSummary {
    pub parent_id: String,
    pub member_id: String,
    pub attended: u32,
    pub missed: u32,
    pub total_past_sessions: u32,
    pub attendance_threshold: Option<i32>,
    pub flagged: bool,
    pub next_session: Option<SessionView>,
    pub previous_session: Option<SessionView>,
    pub past_sessions: Vec<PastSession>,
    pub upcoming_sessions: Vec<SessionView>,
}

#[derive(Debug, Serialize, Clone)]
pub struct MemberAttendanceSummary {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub attended: u32,
    pub missed: u32,
    pub is_flagged: bool,
}

/// Organizer view of a series: sessions split at `now` plus every member's
/// standing.
#[derive(Debug, Serialize, Clone)]
pub struct SeriesFamily {
    pub parent: Event,
    pub past_children: Vec<SessionView>,
    pub upcoming_children: Vec<SessionView>,
    pub total_past_sessions: u32,
    pub members: Vec<MemberAttendanceSummary>,
}
