use attendance_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::{auth::Claims, user::{Identity, Role, User}},
    domain::services::event_service::{CreatedEvent, EventDraft},
    infra::factory::run_sqlite_migrations,
    infra::repositories::{
        sqlite_attendance_repo::SqliteAttendanceRepo,
        sqlite_event_repo::SqliteEventRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode, header},
    Router,
};
use std::str::FromStr;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::ServiceExt;
use serde_json::Value;

pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use";
pub const TEST_AUDIENCE: &str = "attendance-frontend";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_max_series_sessions(500).await
    }

    pub async fn with_max_series_sessions(max_series_sessions: usize) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_sqlite_migrations(&pool).await;

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_audience: TEST_AUDIENCE.to_string(),
            default_checkin_open_minutes: 15,
            default_timezone: "UTC".to_string(),
            max_series_sessions,
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteEventRepo::new(pool.clone())),
            Arc::new(SqliteAttendanceRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn seed_user(&self, email: &str, name: &str, roles: &[Role]) -> Identity {
        let user = User::new(email.to_string(), name.to_string());
        let created = self.state.user_repo.create(&user, roles).await.expect("Failed to seed user");
        Identity::new(created, roles.to_vec())
    }

    pub fn token_for(&self, user_id: &str) -> String {
        mint_token(user_id, TEST_AUDIENCE, TEST_JWT_SECRET)
    }

    pub async fn create_event(&self, organizer: &Identity, draft: EventDraft) -> CreatedEvent {
        self.state.event_service.create_event(organizer, draft).await.expect("Failed to create event")
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        extra_headers: &[(&str, &str)],
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_json(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.send(method, uri, token, body, &[]).await;
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn attendance_rows(&self, event_id: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendances WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub fn mint_token(user_id: &str, audience: &str, secret: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        aud: audience.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        iat: Utc::now().timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

#[allow(dead_code)]
pub async fn parse_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
}

#[allow(dead_code)]
pub fn utc(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

#[allow(dead_code)]
pub fn standalone_draft(name: &str, start: &str, end: &str) -> EventDraft {
    EventDraft {
        name: name.to_string(),
        location: "Main Hall".to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        timezone: Some("UTC".to_string()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn series_draft(
    name: &str,
    start: &str,
    end: &str,
    weekdays: &[&str],
    end_date: &str,
    threshold: Option<i32>,
    member_ids: Vec<String>,
) -> EventDraft {
    EventDraft {
        name: name.to_string(),
        location: "Studio".to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        timezone: Some("UTC".to_string()),
        recurring: true,
        weekdays: weekdays.iter().map(|d| d.to_string()).collect(),
        end_date: Some(end_date.to_string()),
        attendance_threshold: threshold,
        member_ids,
        ..Default::default()
    }
}
