use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::AdminUser;
use crate::api::dtos::requests::{CreateUnbanRequest, RejectUnbanRequest, UnbanListQuery};
use crate::domain::models::unban_request::{UnbanRequest, UNBAN_APPROVED, UNBAN_PENDING, UNBAN_REJECTED};
use crate::domain::services::auth_service::verify_password;
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Banned users cannot hold a token, so the request is authenticated by credentials.
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUnbanRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_email(&payload.email.trim().to_lowercase()).await?
        .ok_or(AppError::Unauthorized)?;
    verify_password(&payload.password, &user.password_hash)?;

    if !user.is_banned {
        return Err(AppError::Conflict("Account is not suspended".into()));
    }

    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::Validation("Message is required".into()));
    }

    if state.unban_repo.find_pending_for_user(&user.id).await?.is_some() {
        return Err(AppError::Conflict("An unban request is already pending".into()));
    }

    let created = state.unban_repo.create(&UnbanRequest::new(user.id.clone(), message)).await?;
    info!("Unban request {} submitted by user {}", created.id, user.id);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<UnbanListQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(status) = query.status.as_deref()
        && ![UNBAN_PENDING, UNBAN_APPROVED, UNBAN_REJECTED].contains(&status)
    {
        return Err(AppError::Validation(format!("Unknown unban request status '{}'", status)));
    }

    Ok(Json(state.unban_repo.list(query.status.as_deref()).await?))
}

async fn find_pending(state: &AppState, request_id: &str) -> Result<UnbanRequest, AppError> {
    let request = state.unban_repo.find_by_id(request_id).await?
        .ok_or(AppError::NotFound("Unban request not found".into()))?;
    if !request.is_pending() {
        return Err(AppError::Conflict(format!("Unban request already {}", request.status)));
    }
    Ok(request)
}

pub async fn approve_request(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(request_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let request = find_pending(&state, &request_id).await?;

    let resolved = state.unban_repo.resolve(&request.id, UNBAN_APPROVED, None, Utc::now()).await?;
    state.user_repo.set_ban(&request.user_id, false, None).await?;

    info!("Admin {} approved unban request {} for user {}", admin.id, request.id, request.user_id);

    Ok(Json(resolved))
}

pub async fn reject_request(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(request_id): Path<String>,
    Json(payload): Json<RejectUnbanRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = find_pending(&state, &request_id).await?;

    let response = payload.response.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    let resolved = state.unban_repo.resolve(&request.id, UNBAN_REJECTED, response, Utc::now()).await?;

    info!("Admin {} rejected unban request {}", admin.id, request.id);

    Ok(Json(resolved))
}
