use crate::domain::{models::event::{Event, EventMember}, ports::EventRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::error;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_event(conn: &mut PgConnection, event: &Event) -> Result<Event, AppError> {
    sqlx::query_as::<_, Event>(
        "INSERT INTO events (id, name, location, notes, start_time, end_time, timezone, checkin_open_minutes, checkin_token, organizer_id, parent_id, recurring, weekdays, recurring_until, attendance_threshold, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) RETURNING *",
    )
        .bind(&event.id)
        .bind(&event.name)
        .bind(&event.location)
        .bind(&event.notes)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(&event.timezone)
        .bind(event.checkin_open_minutes)
        .bind(&event.checkin_token)
        .bind(&event.organizer_id)
        .bind(&event.parent_id)
        .bind(event.recurring)
        .bind(&event.weekdays)
        .bind(event.recurring_until)
        .bind(event.attendance_threshold)
        .bind(event.created_at)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::TokenCollision
            } else {
                AppError::Database(e)
            }
        })
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create_series(&self, head: &Event, sessions: &[Event], member_ids: &[String]) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = insert_event(&mut *tx, head).await?;
        for session in sessions {
            insert_event(&mut *tx, session).await?;
        }

        for user_id in member_ids {
            let member = EventMember::new(created.id.clone(), user_id.clone());
            sqlx::query("INSERT INTO event_members (event_id, user_id, created_at) VALUES ($1, $2, $3)")
                .bind(&member.event_id)
                .bind(&member.user_id)
                .bind(member.created_at)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE checkin_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE parent_id = $1 ORDER BY start_time ASC, id ASC")
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_organizer(&self, organizer_id: &str) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE organizer_id = $1 ORDER BY start_time ASC, id ASC")
            .bind(organizer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_member_ids(&self, event_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT user_id FROM event_members WHERE event_id = $1 ORDER BY user_id ASC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_series_for_member(&self, user_id: &str) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT e.* FROM events e JOIN event_members m ON m.event_id = e.id WHERE m.user_id = $1 AND e.recurring = TRUE AND e.parent_id IS NULL ORDER BY e.start_time ASC",
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        // children, members and attendance rows cascade
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres Event Deletion Failed: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }
}
