use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::models::{
    attendance::CheckInHistoryEntry,
    event::Event,
    summary::{AttendanceSummary, SessionView},
    user::Role,
};
use crate::domain::ports::{AttendanceRepository, EventRepository};
use crate::domain::services::aggregator::AttendanceService;
use crate::error::AppError;

const RECENT_CHECKINS: usize = 10;

#[derive(Debug, Serialize)]
pub struct SeriesOverview {
    pub series: SessionView,
    pub summary: AttendanceSummary,
}

#[derive(Debug, Serialize)]
pub struct EventListing {
    #[serde(flatten)]
    pub event: Event,
    pub attendance_count: i64,
}

#[derive(Debug, Serialize)]
pub struct OrganizerDashboard {
    pub upcoming: Vec<EventListing>,
    pub past: Vec<EventListing>,
}

#[derive(Debug, Serialize)]
pub struct AttendeeDashboard {
    pub series: Vec<SeriesOverview>,
    pub recent_checkins: Vec<CheckInHistoryEntry>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum Dashboard {
    Attendee(AttendeeDashboard),
    Organizer(OrganizerDashboard),
}

/// Series with an upcoming session come first, soonest first; finished
/// series trail in name order.
pub fn sort_by_next_session(overviews: &mut [SeriesOverview]) {
    overviews.sort_by(|a, b| {
        let key = |o: &SeriesOverview| {
            (
                o.summary.next_session.is_none(),
                o.summary.next_session.as_ref().map(|s| (s.start_time, s.id.clone())),
                o.series.name.clone(),
                o.series.id.clone(),
            )
        };
        key(a).cmp(&key(b))
    });
}

/// Splits check-in targets at `now` by `end_time`: upcoming ascending by
/// start, past most recent first. Series heads are skipped.
pub fn split_by_end_time(events: Vec<Event>, now: DateTime<Utc>) -> (Vec<Event>, Vec<Event>) {
    let (mut past, mut upcoming): (Vec<Event>, Vec<Event>) = events
        .into_iter()
        .filter(Event::is_session)
        .partition(|e| e.is_past(now));

    upcoming.sort_by(|a, b| (a.start_time, &a.id).cmp(&(b.start_time, &b.id)));
    past.sort_by(|a, b| (b.start_time, &b.id).cmp(&(a.start_time, &a.id)));
    (upcoming, past)
}

pub struct DashboardService {
    event_repo: Arc<dyn EventRepository>,
    attendance_repo: Arc<dyn AttendanceRepository>,
    attendance_service: Arc<AttendanceService>,
}

impl DashboardService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        attendance_repo: Arc<dyn AttendanceRepository>,
        attendance_service: Arc<AttendanceService>,
    ) -> Self {
        Self { event_repo, attendance_repo, attendance_service }
    }

    /// The view follows the active role only; callers have already checked
    /// that the user holds it.
    pub async fn build(&self, user_id: &str, active_role: Role, now: DateTime<Utc>) -> Result<Dashboard, AppError> {
        match active_role {
            Role::Attendee => Ok(Dashboard::Attendee(self.attendee_view(user_id, now).await?)),
            Role::Organizer | Role::Admin => Ok(Dashboard::Organizer(self.organizer_view(user_id, now).await?)),
        }
    }

    pub async fn attendee_view(&self, user_id: &str, now: DateTime<Utc>) -> Result<AttendeeDashboard, AppError> {
        let heads = self.event_repo.list_series_for_member(user_id).await?;

        let mut series = Vec::with_capacity(heads.len());
        for head in &heads {
            let summary = self.attendance_service.summary_for_member(&head.id, user_id, now).await?;
            series.push(SeriesOverview { series: SessionView::from(head), summary });
        }
        sort_by_next_session(&mut series);

        let mut recent_checkins = self.attendance_repo.history_for_attendee(user_id).await?;
        recent_checkins.truncate(RECENT_CHECKINS);

        Ok(AttendeeDashboard { series, recent_checkins })
    }

    pub async fn organizer_view(&self, organizer_id: &str, now: DateTime<Utc>) -> Result<OrganizerDashboard, AppError> {
        let events = self.event_repo.list_by_organizer(organizer_id).await?;
        let (upcoming, past) = split_by_end_time(events, now);

        Ok(OrganizerDashboard {
            upcoming: self.with_counts(upcoming).await?,
            past: self.with_counts(past).await?,
        })
    }

    pub(crate) async fn with_counts(&self, events: Vec<Event>) -> Result<Vec<EventListing>, AppError> {
        let mut listings = Vec::with_capacity(events.len());
        for event in events {
            let attendance_count = self.attendance_repo.count_by_event(&event.id).await?;
            listings.push(EventListing { event, attendance_count });
        }
        Ok(listings)
    }
}
