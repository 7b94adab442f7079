use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::user::User;
use crate::error::AppError;
use std::sync::Arc;
use tracing::Span;

/// Caller identified by a bearer access token, re-read from storage on every request.
pub struct AuthUser(pub User);

/// Authenticated caller with the admin role.
pub struct AdminUser(pub User);

pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    parts.headers.get(AUTHORIZATION)?
        .to_str().ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves a token to the stored user. Deleted accounts are 401, banned ones 403.
pub(crate) async fn resolve_user(state: &AppState, token: &str) -> Result<User, AppError> {
    let claims = state.auth_service.verify_access_token(token)?;

    let user = state.user_repo.find_by_id(&claims.sub).await?
        .ok_or(AppError::Unauthorized)?;

    if user.is_banned {
        return Err(AppError::Banned { reason: user.ban_reason });
    }
    Ok(user)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let user = resolve_user(&app_state, token).await?;

        Span::current().record("user_id", user.id.as_str());
        Span::current().record("role", user.role.as_str());

        Ok(AuthUser(user))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Administrator access required".into()));
        }
        Ok(AdminUser(user))
    }
}
