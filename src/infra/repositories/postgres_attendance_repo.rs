use crate::domain::{
    models::attendance::{Attendance, CheckInHistoryEntry, RosterEntry},
    ports::AttendanceRepository,
};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

pub struct PostgresAttendanceRepo {
    pool: PgPool,
}

impl PostgresAttendanceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for PostgresAttendanceRepo {
    async fn record(&self, attendance: &Attendance) -> Result<Attendance, AppError> {
        sqlx::query_as::<_, Attendance>(
            "INSERT INTO attendances (id, event_id, attendee_id, checked_in_at, source_ip, user_agent) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
            .bind(&attendance.id)
            .bind(&attendance.event_id)
            .bind(&attendance.attendee_id)
            .bind(attendance.checked_in_at)
            .bind(&attendance.source_ip)
            .bind(&attendance.user_agent)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::AlreadyCheckedIn
                } else {
                    AppError::Database(e)
                }
            })
    }

    async fn exists(&self, event_id: &str, attendee_id: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM attendances WHERE event_id = $1 AND attendee_id = $2")
            .bind(event_id)
            .bind(attendee_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Attendance>, AppError> {
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendances WHERE event_id = $1 ORDER BY checked_in_at ASC, id ASC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM attendances WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.get("count"))
    }

    async fn list_for_series(&self, parent_id: &str) -> Result<Vec<Attendance>, AppError> {
        sqlx::query_as::<_, Attendance>(
            "SELECT a.* FROM attendances a JOIN events e ON e.id = a.event_id WHERE e.parent_id = $1",
        )
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn roster(&self, event_id: &str) -> Result<Vec<RosterEntry>, AppError> {
        sqlx::query_as::<_, RosterEntry>(
            "SELECT a.id AS attendance_id, a.attendee_id, u.name, u.email, a.checked_in_at FROM attendances a JOIN users u ON u.id = a.attendee_id WHERE a.event_id = $1 ORDER BY a.checked_in_at ASC",
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn history_for_attendee(&self, attendee_id: &str) -> Result<Vec<CheckInHistoryEntry>, AppError> {
        sqlx::query_as::<_, CheckInHistoryEntry>(
            "SELECT a.id, a.event_id, a.checked_in_at, e.name AS event_name, e.location AS event_location, e.start_time AS event_start_time FROM attendances a JOIN events e ON e.id = a.event_id WHERE a.attendee_id = $1 ORDER BY a.checked_in_at DESC",
        )
            .bind(attendee_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
