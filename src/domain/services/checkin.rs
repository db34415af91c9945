use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use crate::domain::models::{attendance::Attendance, event::Event};
use crate::domain::ports::{AttendanceRepository, EventRepository};
use crate::error::AppError;

/// A session accepts check-ins from `checkin_open_minutes` before its own
/// start through its own end, both bounds inclusive.
pub fn check_window(session: &Event, now: DateTime<Utc>) -> Result<(), AppError> {
    if now < session.checkin_opens_at() || now > session.end_time {
        return Err(AppError::WindowClosed);
    }
    Ok(())
}

pub struct CheckInAttempt {
    pub token: String,
    pub attendee_id: String,
    pub now: DateTime<Utc>,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug)]
pub struct CheckInOutcome {
    pub session: Event,
    pub attendance: Attendance,
}

pub struct CheckInService {
    event_repo: Arc<dyn EventRepository>,
    attendance_repo: Arc<dyn AttendanceRepository>,
}

impl CheckInService {
    pub fn new(event_repo: Arc<dyn EventRepository>, attendance_repo: Arc<dyn AttendanceRepository>) -> Self {
        Self { event_repo, attendance_repo }
    }

    /// Validates the token against the session's window and records exactly
    /// one attendance per attendee. Concurrent duplicates lose at the unique
    /// index and come back as `AlreadyCheckedIn`.
    #[instrument(skip(self, attempt), fields(attendee_id = %attempt.attendee_id))]
    pub async fn check_in(&self, attempt: CheckInAttempt) -> Result<CheckInOutcome, AppError> {
        let session = self
            .event_repo
            .find_by_token(&attempt.token)
            .await?
            .filter(Event::is_session)
            .ok_or(AppError::TokenNotFound)?;

        check_window(&session, attempt.now)?;

        if self.attendance_repo.exists(&session.id, &attempt.attendee_id).await? {
            return Err(AppError::AlreadyCheckedIn);
        }

        let attendance = Attendance::new(
            session.id.clone(),
            attempt.attendee_id,
            attempt.now,
            attempt.source_ip,
            attempt.user_agent,
        );
        let attendance = self.attendance_repo.record(&attendance).await?;

        info!(event_id = %session.id, attendance_id = %attendance.id, "Check-in recorded");
        Ok(CheckInOutcome { session, attendance })
    }
}
