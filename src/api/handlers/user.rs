use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CreateUserRequest, GrantRoleRequest};
use crate::domain::models::user::{Identity, Role, User};
use std::sync::Arc;
use crate::error::AppError;
use tracing::{info, error};

pub async fn get_me(auth: AuthUser) -> impl IntoResponse {
    Json(serde_json::json!({
        "user": auth.identity,
        "active_role": auth.active_role,
    }))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_any(&[Role::Admin])?;

    let users = state.user_repo.list().await?;
    let mut identities = Vec::with_capacity(users.len());
    for user in users {
        let roles = state.user_repo.roles_of(&user.id).await?;
        identities.push(Identity::new(user, roles));
    }
    Ok(Json(identities))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_any(&[Role::Admin])?;

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    if state.user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let roles = if payload.roles.is_empty() { vec![Role::Attendee] } else { payload.roles };
    let user = User::new(email, payload.name.trim().to_string());
    let created = state.user_repo.create(&user, &roles).await?;

    info!("Created user: {}", created.id);
    Ok((StatusCode::CREATED, Json(Identity::new(created, roles))))
}

pub async fn grant_role(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Json(payload): Json<GrantRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_any(&[Role::Admin])?;

    let user = state.user_repo.find_by_id(&user_id).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    state.user_repo.grant_role(&user.id, payload.role).await?;

    info!(user_id = %user.id, role = %payload.role, "Role granted");
    let roles = state.user_repo.roles_of(&user.id).await?;
    Ok(Json(Identity::new(user, roles)))
}

pub async fn revoke_role(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((user_id, role)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_any(&[Role::Admin])?;

    let role: Role = role.parse().map_err(AppError::Validation)?;
    if role == Role::Admin && user_id == auth.id() {
        return Err(AppError::Conflict("Cannot revoke your own admin role".into()));
    }

    let user = state.user_repo.find_by_id(&user_id).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    state.user_repo.revoke_role(&user.id, role).await?;

    info!(user_id = %user.id, role = %role, "Role revoked");
    let roles = state.user_repo.roles_of(&user.id).await?;
    Ok(Json(Identity::new(user, roles)))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_any(&[Role::Admin])?;

    if auth.id() == user_id {
        return Err(AppError::Conflict("Cannot delete yourself".into()));
    }

    match state.user_repo.delete(&user_id).await {
        Ok(_) => {
            info!("Deleted user {}", user_id);
            Ok(StatusCode::NO_CONTENT)
        },
        Err(e) => {
            error!("Failed to delete user {}: {:?}", user_id, e);
            Err(e)
        }
    }
}
