use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::{auth::{AuthUser, AdminUser}, maybe_auth::MaybeAuthUser};
use crate::api::dtos::requests::{RegisterRequest, UpdateUserRequest, BanRequest, ListUsersQuery};
use crate::domain::models::user::{Role, User};
use crate::domain::models::job::{Job, JOB_VERIFY_EMAIL};
use crate::domain::models::unban_request::UNBAN_APPROVED;
use crate::domain::services::auth_service::{generate_verification_code, hash_password, validate_password};
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

fn parse_role(raw: &str) -> Result<Role, AppError> {
    raw.parse().map_err(AppError::Validation)
}

fn normalize(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created_by_admin = caller.as_ref().is_some_and(User::is_admin);

    let role = match payload.role.as_deref() {
        Some(raw) => parse_role(raw)?,
        None => Role::Client,
    };
    if role == Role::Admin && !created_by_admin {
        return Err(AppError::Forbidden("Only administrators can create administrator accounts".into()));
    }

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email address is required".into()));
    }
    validate_password(&payload.password)?;

    if state.user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let mut user = User::new(name, email, hash_password(&payload.password)?, role);
    user.phone = normalize(payload.phone);
    user.bio = normalize(payload.bio);

    let pre_verified = created_by_admin && payload.is_verified.unwrap_or(false);
    if pre_verified {
        user.is_verified = true;
    } else {
        user.verification_code = Some(generate_verification_code());
    }

    let created = state.user_repo.create(&user).await?;

    if !pre_verified {
        state.job_repo.create(&Job::new(JOB_VERIFY_EMAIL, created.id.clone(), Utc::now())).await?;
    }

    info!("Registered {} user: {}", created.role, created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

/// `role=professional` is the public directory; every other listing is admin-only.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(raw) = query.role.as_deref() {
        parse_role(raw)?;
    }

    match caller {
        Some(user) if user.is_admin() => {
            Ok(Json(state.user_repo.list(query.role.as_deref()).await?))
        }
        _ if query.role.as_deref() == Some(Role::Professional.as_str()) => {
            let professionals = state.user_repo.list(Some(Role::Professional.as_str())).await?
                .into_iter()
                .filter(|u| u.is_verified && !u.is_banned)
                .collect::<Vec<_>>();
            Ok(Json(professionals))
        }
        Some(_) => Err(AppError::Forbidden("Administrator access required".into())),
        None => Err(AppError::Unauthorized),
    }
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if user.is_professional() {
        return Ok(Json(user));
    }

    match caller {
        Some(c) if c.can_manage(&user.id) => Ok(Json(user)),
        Some(_) => Err(AppError::Forbidden("Access denied".into())),
        None => Err(AppError::Unauthorized),
    }
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !caller.can_manage(&user_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }

    let mut user = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
        user.name = name;
    }
    if payload.phone.is_some() {
        user.phone = normalize(payload.phone);
    }
    if payload.bio.is_some() {
        user.bio = normalize(payload.bio);
    }
    if let Some(raw) = payload.role.as_deref() {
        if !caller.is_admin() {
            return Err(AppError::Forbidden("Only administrators can change roles".into()));
        }
        user.role = parse_role(raw)?.as_str().to_string();
    }

    let updated = state.user_repo.update(&user).await?;
    info!("User updated: {}", updated.id);

    Ok(Json(updated))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if admin.id == user_id {
        return Err(AppError::Forbidden("Administrators cannot delete their own account".into()));
    }

    state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    state.auth_service.revoke_all(&user_id).await?;
    state.user_repo.delete(&user_id).await?;

    info!("Admin {} deleted user {}", admin.id, user_id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn ban_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
    Json(payload): Json<BanRequest>,
) -> Result<impl IntoResponse, AppError> {
    if admin.id == user_id {
        return Err(AppError::Forbidden("Administrators cannot ban themselves".into()));
    }

    let target = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if target.is_admin() {
        return Err(AppError::Forbidden("Administrators cannot be banned".into()));
    }

    let banned = state.user_repo.set_ban(&user_id, true, normalize(payload.reason)).await?;
    state.auth_service.revoke_all(&user_id).await?;

    info!("Admin {} banned user {}", admin.id, user_id);

    Ok(Json(banned))
}

pub async fn unban_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let unbanned = state.user_repo.set_ban(&user_id, false, None).await?;

    // A direct unban settles any open appeal.
    if let Some(request) = state.unban_repo.find_pending_for_user(&user_id).await? {
        state.unban_repo.resolve(&request.id, UNBAN_APPROVED, Some("Unbanned by administrator".into()), Utc::now()).await?;
    }

    info!("Admin {} unbanned user {}", admin.id, user_id);

    Ok(Json(unbanned))
}
