use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = state.dashboard_service
        .build(auth.id(), auth.active_role, Utc::now())
        .await?;
    Ok(Json(dashboard))
}
