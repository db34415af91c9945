use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Event not found")]
    TokenNotFound,
    #[error("Check-in not open for this event")]
    WindowClosed,
    #[error("Already checked in")]
    AlreadyCheckedIn,
    #[error("Check-in token collision")]
    TokenCollision,
}

impl AppError {
    /// Stable identifier for the error kind, exposed to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::Validation(_) => "validation_error",
            AppError::TokenNotFound => "token_not_found",
            AppError::WindowClosed => "window_closed",
            AppError::AlreadyCheckedIn => "already_checked_in",
            AppError::TokenCollision => "token_collision",
        }
    }
}

/// True when the driver reports a unique/primary key violation.
///
/// 2067 = SQLite unique constraint, 1555 = SQLite primary key,
/// 23505 = PostgreSQL unique violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "2067" || code == "1555" || code == "23505")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)", "kind": "conflict" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::TokenNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::WindowClosed => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::AlreadyCheckedIn => {
                info!("Duplicate check-in rejected");
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::TokenCollision => {
                error!("Check-in token collision escaped retry loop");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}
