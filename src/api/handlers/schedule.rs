use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::responses::ScheduleResponse;
use crate::api::handlers::availability::find_professional;
use crate::domain::models::schedule::{ProfessionalSchedule, WeeklySchedule};
use crate::domain::services::availability::{default_weekly_schedule, validate_weekly_schedule};
use crate::error::AppError;
use std::sync::Arc;
use tracing::{error, info};

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(professional_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    find_professional(&state, &professional_id).await?;

    let response = match state.schedule_repo.find(&professional_id).await? {
        Some(row) => ScheduleResponse { professional_id, schedule: row.schedule(), is_default: false },
        None => ScheduleResponse { professional_id, schedule: default_weekly_schedule(), is_default: true },
    };

    Ok(Json(response))
}

pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(professional_id): Path<String>,
    Json(schedule): Json<WeeklySchedule>,
) -> Result<impl IntoResponse, AppError> {
    if !caller.can_manage(&professional_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }
    find_professional(&state, &professional_id).await?;

    validate_weekly_schedule(&schedule).map_err(AppError::Validation)?;

    let row = ProfessionalSchedule::new(professional_id.clone(), &schedule).map_err(|e| {
        error!("Failed to serialize schedule: {}", e);
        AppError::Internal
    })?;
    let saved = state.schedule_repo.upsert(&row).await?;

    info!("Schedule updated for professional {}", professional_id);

    Ok(Json(ScheduleResponse { professional_id, schedule: saved.schedule(), is_default: false }))
}
