use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::{Identity, Role};
use crate::error::AppError;
use std::sync::Arc;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::{debug, Span};

pub const ACTIVE_ROLE_HEADER: &str = "X-Active-Role";

/// The caller, with roles loaded from storage on every request.
///
/// `active_role` only selects a view; it never grants anything the stored
/// role set does not already hold.
pub struct AuthUser {
    pub identity: Identity,
    pub active_role: Role,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
        if self.identity.has_any_role(roles) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Insufficient role".into()))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let bearer = parts.headers.get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&app_state.config.jwt_audience]);

        let token_data = decode::<Claims>(
            bearer,
            &DecodingKey::from_secret(app_state.config.jwt_secret.as_bytes()),
            &validation,
        )
            .map_err(|e| {
                debug!("Rejected bearer token: {}", e);
                AppError::Unauthorized
            })?;

        let user = app_state.user_repo.find_by_id(&token_data.claims.sub).await?
            .ok_or(AppError::Unauthorized)?;
        let roles = app_state.user_repo.roles_of(&user.id).await?;
        let identity = Identity::new(user, roles);

        let active_role = match parts.headers.get(ACTIVE_ROLE_HEADER) {
            Some(raw) => {
                let role = raw.to_str().ok()
                    .and_then(|v| v.parse::<Role>().ok())
                    .ok_or_else(|| AppError::Validation(format!("Invalid {} header", ACTIVE_ROLE_HEADER)))?;
                if !identity.has_role(role) {
                    return Err(AppError::Forbidden(format!("Role '{}' is not held by this user", role)));
                }
                role
            }
            None => identity.primary_role(),
        };

        Span::current().record("user_id", identity.id());
        Span::current().record("active_role", active_role.as_str());

        Ok(AuthUser { identity, active_role })
    }
}
