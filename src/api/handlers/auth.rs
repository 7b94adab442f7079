use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{LoginRequest, RefreshRequest, VerifyEmailRequest, ResendVerificationRequest};
use crate::api::dtos::responses::MessageResponse;
use crate::domain::models::auth::AuthResponse;
use crate::domain::models::job::{Job, JOB_VERIFY_EMAIL};
use crate::domain::services::auth_service::{generate_verification_code, verify_password};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();
    let user = state.user_repo.find_by_email(&email).await?
        .ok_or(AppError::Unauthorized)?;

    verify_password(&payload.password, &user.password_hash)?;

    if user.is_banned {
        warn!("Banned user attempted login: {}", user.id);
        return Err(AppError::Banned { reason: user.ban_reason });
    }
    if !user.is_verified {
        return Err(AppError::Unverified);
    }

    let tokens = state.auth_service.login(&user).await?;

    info!("User logged in: {}", user.id);

    Ok(Json(AuthResponse {
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user,
    }))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.auth_service.find_refresh_record(&payload.refresh_token).await?;

    let user = state.user_repo.find_by_id(&record.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    if user.is_banned {
        return Err(AppError::Banned { reason: user.ban_reason });
    }

    let tokens = state.auth_service.refresh(&payload.refresh_token, &user).await?;

    info!("Token refreshed for user: {}", user.id);

    Ok(Json(AuthResponse {
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user,
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.logout(&payload.refresh_token).await?;

    info!("User logged out");

    Ok(StatusCode::OK)
}

pub async fn me(AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user))
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::Validation("Invalid verification code".into());

    let user = state.user_repo.find_by_email(&payload.email.trim().to_lowercase()).await?
        .ok_or_else(invalid)?;

    if user.is_verified {
        return Ok(Json(MessageResponse::new("Email already verified")));
    }

    if user.verification_code.as_deref() != Some(payload.code.trim()) {
        return Err(invalid());
    }

    state.user_repo.set_verification(&user.id, true, None).await?;
    info!("User verified email: {}", user.id);

    Ok(Json(MessageResponse::new("Email verified")))
}

/// Always answers the same way so the endpoint cannot be used to probe for accounts.
pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResendVerificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();

    if let Some(user) = state.user_repo.find_by_email(&email).await?
        && !user.is_verified
    {
        let code = generate_verification_code();
        state.user_repo.set_verification(&user.id, false, Some(code)).await?;
        state.job_repo.cancel_jobs_for_subject(&user.id, JOB_VERIFY_EMAIL).await?;
        state.job_repo.create(&Job::new(JOB_VERIFY_EMAIL, user.id.clone(), Utc::now())).await?;
        info!("Verification code re-issued for user: {}", user.id);
    }

    Ok(Json(MessageResponse::new("If the account exists and is unverified, a new code has been sent")))
}
