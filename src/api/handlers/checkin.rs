use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AuthUser, client::ClientInfo};
use crate::api::dtos::{requests::CheckInRequest, responses::CheckInResponse};
use crate::domain::models::user::Role;
use crate::domain::services::checkin::CheckInAttempt;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

pub async fn check_in(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    client: ClientInfo,
    Json(payload): Json<CheckInRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_any(&[Role::Attendee, Role::Organizer, Role::Admin])?;

    let outcome = state.checkin_service.check_in(CheckInAttempt {
        token: payload.event_token.trim().to_string(),
        attendee_id: auth.id().to_string(),
        now: Utc::now(),
        source_ip: client.ip,
        user_agent: client.user_agent,
    }).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckInResponse { attendance: outcome.attendance, event_name: outcome.session.name }),
    ))
}

pub async fn list_my_checkins(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let history = state.attendance_repo.history_for_attendee(auth.id()).await?;
    Ok(Json(history))
}
