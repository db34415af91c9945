use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use crate::domain::models::{
    event::Event,
    summary::{AttendanceSummary, MemberAttendanceSummary, PastSession, SeriesFamily, SessionView},
};
use crate::domain::ports::{AttendanceRepository, EventRepository, UserRepository};
use crate::error::AppError;

/// A member is flagged only when a threshold is set and strictly exceeded.
pub fn is_flagged(missed: u32, threshold: Option<i32>) -> bool {
    threshold.is_some_and(|t| i64::from(missed) > i64::from(t))
}

/// Sessions of a series ordered by `(start_time, id)`.
pub fn ordered_sessions<'a>(parent: &Event, sessions: &'a [Event]) -> Vec<&'a Event> {
    let mut ordered: Vec<&Event> = sessions
        .iter()
        .filter(|s| s.parent_id.as_deref() == Some(parent.id.as_str()))
        .collect();
    ordered.sort_by(|a, b| (a.start_time, &a.id).cmp(&(b.start_time, &b.id)));
    ordered
}

/// Projects one member's attendance over a series at `now`.
///
/// A session is past once `end_time < now`; only past sessions count towards
/// attended and missed. `attended_event_ids` are the session ids the member
/// has an attendance row for.
pub fn summarize(
    parent: &Event,
    sessions: &[Event],
    attended_event_ids: &HashSet<String>,
    member_id: &str,
    now: DateTime<Utc>,
) -> AttendanceSummary {
    let (past, upcoming): (Vec<&Event>, Vec<&Event>) = ordered_sessions(parent, sessions)
        .into_iter()
        .partition(|s| s.is_past(now));

    let past_sessions: Vec<PastSession> = past
        .iter()
        .map(|s| PastSession {
            session: SessionView::from(*s),
            attended: attended_event_ids.contains(&s.id),
        })
        .collect();

    let total_past_sessions = past_sessions.len() as u32;
    let attended = past_sessions.iter().filter(|p| p.attended).count() as u32;
    let missed = total_past_sessions - attended;

    AttendanceSummary {
        parent_id: parent.id.clone(),
        member_id: member_id.to_string(),
        attended,
        missed,
        total_past_sessions,
        attendance_threshold: parent.attendance_threshold,
        flagged: is_flagged(missed, parent.attendance_threshold),
        next_session: upcoming.first().map(|s| SessionView::from(*s)),
        previous_session: past.last().map(|s| SessionView::from(*s)),
        past_sessions,
        upcoming_sessions: upcoming.iter().map(|s| SessionView::from(*s)).collect(),
    }
}

pub struct AttendanceService {
    event_repo: Arc<dyn EventRepository>,
    attendance_repo: Arc<dyn AttendanceRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl AttendanceService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        attendance_repo: Arc<dyn AttendanceRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self { event_repo, attendance_repo, user_repo }
    }

    pub async fn load_series(&self, parent_id: &str) -> Result<(Event, Vec<Event>), AppError> {
        let parent = self
            .event_repo
            .find_by_id(parent_id)
            .await?
            .filter(Event::is_series_head)
            .ok_or_else(|| AppError::NotFound("Recurring series not found".into()))?;
        let children = self.event_repo.list_children(parent_id).await?;
        Ok((parent, children))
    }

    pub async fn is_member(&self, parent_id: &str, user_id: &str) -> Result<bool, AppError> {
        let members = self.event_repo.list_member_ids(parent_id).await?;
        Ok(members.iter().any(|m| m == user_id))
    }

    /// Attended session ids per attendee for the whole series.
    async fn attendance_by_member(&self, parent_id: &str) -> Result<HashMap<String, HashSet<String>>, AppError> {
        let rows = self.attendance_repo.list_for_series(parent_id).await?;
        let mut by_member: HashMap<String, HashSet<String>> = HashMap::new();
        for row in rows {
            by_member.entry(row.attendee_id).or_default().insert(row.event_id);
        }
        Ok(by_member)
    }

    pub async fn summary_for_member(
        &self,
        parent_id: &str,
        member_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AttendanceSummary, AppError> {
        let (parent, children) = self.load_series(parent_id).await?;
        let attended = self
            .attendance_by_member(parent_id)
            .await?
            .remove(member_id)
            .unwrap_or_default();
        Ok(summarize(&parent, &children, &attended, member_id, now))
    }

    pub async fn family(&self, parent_id: &str, now: DateTime<Utc>) -> Result<SeriesFamily, AppError> {
        let (parent, children) = self.load_series(parent_id).await?;
        let by_member = self.attendance_by_member(parent_id).await?;

        let member_ids = self.event_repo.list_member_ids(parent_id).await?;
        let mut users = self.user_repo.find_many(&member_ids).await?;
        users.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));

        let empty = HashSet::new();
        let members = users
            .into_iter()
            .map(|user| {
                let attended = by_member.get(&user.id).unwrap_or(&empty);
                let summary = summarize(&parent, &children, attended, &user.id, now);
                MemberAttendanceSummary {
                    user_id: user.id,
                    name: user.name,
                    email: user.email,
                    attended: summary.attended,
                    missed: summary.missed,
                    is_flagged: summary.flagged,
                }
            })
            .collect();

        let split = summarize(&parent, &children, &empty, "", now);
        let mut past_children: Vec<SessionView> = split.past_sessions.into_iter().map(|p| p.session).collect();
        past_children.reverse();

        Ok(SeriesFamily {
            parent,
            past_children,
            upcoming_children: split.upcoming_sessions,
            total_past_sessions: split.total_past_sessions,
            members,
        })
    }
}
