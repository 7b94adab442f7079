use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CreateServiceRequest, UpdateServiceRequest, ListServicesQuery};
use crate::domain::models::service::Service;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

fn validate_price(price_cents: i64) -> Result<i64, AppError> {
    if price_cents < 0 {
        return Err(AppError::Validation("Price cannot be negative".into()));
    }
    Ok(price_cents)
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListServicesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let services = state.service_repo.list(query.professional_id.as_deref(), true).await?;
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.service_repo.find_by_id(&service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    Ok(Json(service))
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let professional_id = payload.professional_id.unwrap_or_else(|| caller.id.clone());

    if !caller.is_admin() && !(caller.is_professional() && caller.id == professional_id) {
        return Err(AppError::Forbidden("Only professionals can offer services".into()));
    }

    let professional = state.user_repo.find_by_id(&professional_id).await?
        .ok_or(AppError::NotFound("Professional not found".into()))?;
    if !professional.is_professional() {
        return Err(AppError::Validation("Services must belong to a professional".into()));
    }

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Service name is required".into()));
    }

    let service = Service::new(
        professional_id,
        name,
        payload.description.unwrap_or_default(),
        validate_price(payload.price_cents.unwrap_or(0))?,
    );
    let created = state.service_repo.create(&service).await?;

    info!("Service created: {} for professional {}", created.id, created.professional_id);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(service_id): Path<String>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = state.service_repo.find_by_id(&service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    if !caller.can_manage(&service.professional_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Service name cannot be empty".into()));
        }
        service.name = name;
    }
    if let Some(description) = payload.description { service.description = description; }
    if let Some(price) = payload.price_cents { service.price_cents = validate_price(price)?; }
    if let Some(active) = payload.is_active { service.is_active = active; }

    let updated = state.service_repo.update(&service).await?;
    Ok(Json(updated))
}

pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(service_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.service_repo.find_by_id(&service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    if !caller.can_manage(&service.professional_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }

    state.service_repo.delete(&service_id).await?;
    info!("Service deleted: {}", service_id);

    Ok(StatusCode::NO_CONTENT)
}
