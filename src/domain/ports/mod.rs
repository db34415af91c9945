use crate::domain::models::{
    attendance::{Attendance, CheckInHistoryEntry, RosterEntry},
    event::Event,
    user::{Role, User},
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User, roles: &[Role]) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_many(&self, ids: &[String]) -> Result<Vec<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn roles_of(&self, user_id: &str) -> Result<Vec<Role>, AppError>;
    async fn grant_role(&self, user_id: &str, role: Role) -> Result<(), AppError>;
    async fn revoke_role(&self, user_id: &str, role: Role) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persists `head`, its generated `sessions` and the series members in
    /// one transaction. A standalone event is a head without sessions.
    /// A duplicate check-in token surfaces as `AppError::TokenCollision`.
    async fn create_series(&self, head: &Event, sessions: &[Event], member_ids: &[String]) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Event>, AppError>;
    async fn list_children(&self, parent_id: &str) -> Result<Vec<Event>, AppError>;
    async fn list_by_organizer(&self, organizer_id: &str) -> Result<Vec<Event>, AppError>;
    async fn list_member_ids(&self, event_id: &str) -> Result<Vec<String>, AppError>;
    async fn list_series_for_member(&self, user_id: &str) -> Result<Vec<Event>, AppError>;
    /// Deletes the event; child sessions, members and attendance cascade.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Inserts the row; a `(event_id, attendee_id)` conflict surfaces as
    /// `AppError::AlreadyCheckedIn`.
    async fn record(&self, attendance: &Attendance) -> Result<Attendance, AppError>;
    async fn exists(&self, event_id: &str, attendee_id: &str) -> Result<bool, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Attendance>, AppError>;
    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError>;
    /// All attendance rows for the generated sessions of a series.
    async fn list_for_series(&self, parent_id: &str) -> Result<Vec<Attendance>, AppError>;
    async fn roster(&self, event_id: &str) -> Result<Vec<RosterEntry>, AppError>;
    async fn history_for_attendee(&self, attendee_id: &str) -> Result<Vec<CheckInHistoryEntry>, AppError>;
}
