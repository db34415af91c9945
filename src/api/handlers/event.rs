use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{CreateEventRequest, SummaryQuery},
    responses::{CreatedEventResponse, TokenEventResponse},
};
use crate::domain::models::{event::Event, user::Role};
use crate::domain::services::{
    dashboard::{split_by_end_time, EventListing},
    event_service::ensure_can_manage,
    export::attendance_csv,
};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

async fn load_event(state: &AppState, event_id: &str) -> Result<Event, AppError> {
    state.event_repo.find_by_id(event_id).await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating event '{}' (recurring: {})", payload.name, payload.recurring);

    let created = state.event_service.create_event(&auth.identity, payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedEventResponse { event: created.event, sessions: created.sessions }),
    ))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = load_event(&state, &event_id).await?;
    ensure_can_manage(&auth.identity, &event)?;
    let attendance_count = state.attendance_repo.count_by_event(&event.id).await?;
    Ok(Json(EventListing { event, attendance_count }))
}

pub async fn get_event_by_token(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_token(&token).await?
        .filter(Event::is_session)
        .ok_or(AppError::TokenNotFound)?;
    let attendance_count = state.attendance_repo.count_by_event(&event.id).await?;
    Ok(Json(TokenEventResponse::new(&event, attendance_count)))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.event_service.delete_event(&auth.identity, &event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_my_upcoming(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_any(&[Role::Organizer, Role::Admin])?;
    let events = state.event_repo.list_by_organizer(auth.id()).await?;
    let (upcoming, _) = split_by_end_time(events, Utc::now());
    Ok(Json(state.dashboard_service.with_counts(upcoming).await?))
}

pub async fn list_my_past(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_any(&[Role::Organizer, Role::Admin])?;
    let events = state.event_repo.list_by_organizer(auth.id()).await?;
    let (_, past) = split_by_end_time(events, Utc::now());
    Ok(Json(state.dashboard_service.with_counts(past).await?))
}

pub async fn list_attendees(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = load_event(&state, &event_id).await?;
    ensure_can_manage(&auth.identity, &event)?;
    let roster = state.attendance_repo.roster(&event.id).await?;
    Ok(Json(roster))
}

pub async fn export_attendance_csv(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = load_event(&state, &event_id).await?;
    ensure_can_manage(&auth.identity, &event)?;

    let rows = state.attendance_repo.list_by_event(&event.id).await?;
    info!(event_id = %event.id, rows = rows.len(), "Exporting attendance CSV");

    let disposition = format!("attachment; filename=\"attendance_{}.csv\"", event.id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        attendance_csv(&rows),
    ))
}

pub async fn get_series_family(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(parent_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let parent = load_event(&state, &parent_id).await?;
    ensure_can_manage(&auth.identity, &parent)?;
    let family = state.attendance_service.family(&parent.id, Utc::now()).await?;
    Ok(Json(family))
}

/// Members read their own summary; organizers and admins may pass
/// `member_id` for anyone in the series.
pub async fn get_series_summary(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(parent_id): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let parent = load_event(&state, &parent_id).await?;
    let member_id = query.member_id.unwrap_or_else(|| auth.id().to_string());

    let can_manage = ensure_can_manage(&auth.identity, &parent).is_ok();
    if !can_manage && member_id != auth.id() {
        return Err(AppError::Forbidden("Not a member of this series".into()));
    }
    if !state.attendance_service.is_member(&parent.id, &member_id).await? {
        return Err(if can_manage {
            AppError::NotFound("Member not part of this series".into())
        } else {
            AppError::Forbidden("Not a member of this series".into())
        });
    }

    let summary = state.attendance_service.summary_for_member(&parent.id, &member_id, Utc::now()).await?;
    Ok(Json(summary))
}
