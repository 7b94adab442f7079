use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{SlotsQuery, OverrideRangeQuery, UpsertOverrideRequest};
use crate::api::dtos::responses::SlotsResponse;
use crate::domain::models::availability::{AvailabilityOverride, AvailabilityOverrideView};
use crate::domain::models::user::User;
use crate::domain::services::availability::{compute_bookable_slots, drop_elapsed, parse_hhmm};
use crate::domain::services::calendar::local_to_utc;
use crate::error::AppError;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Loads a user that must exist and hold the professional role.
pub(crate) async fn find_professional(state: &AppState, professional_id: &str) -> Result<User, AppError> {
    state.user_repo.find_by_id(professional_id).await?
        .filter(User::is_professional)
        .ok_or(AppError::NotFound("Professional not found".into()))
}

/// Bookable slots for a professional on a date, as seen right now in the business timezone.
///
/// Past dates have no slots and elapsed slots are dropped for today.
/// Local times skipped by a DST change are never offered.
/// `exclude` leaves one appointment out of the taken set so it can be rescheduled.
pub(crate) async fn load_bookable_slots(
    state: &AppState,
    professional_id: &str,
    date: NaiveDate,
    exclude: Option<&str>,
) -> Result<Vec<String>, AppError> {
    let local_now = Utc::now().with_timezone(&state.config.business_timezone).naive_local();
    if date < local_now.date() {
        return Ok(Vec::new());
    }

    let schedule = state.schedule_repo.find(professional_id).await?.map(|row| row.schedule());
    let override_rule = state.availability_repo.find_by_date(professional_id, date).await?;
    let taken: Vec<String> = state.appointment_repo.list_active_for_day(professional_id, date).await?
        .into_iter()
        .filter(|a| Some(a.id.as_str()) != exclude)
        .map(|a| a.start_time)
        .collect();

    let tz = state.config.business_timezone;
    let slots: Vec<String> = compute_bookable_slots(schedule.as_ref(), date, override_rule.as_ref(), &taken)
        .into_iter()
        .filter(|slot| local_to_utc(tz, date, slot).is_some())
        .collect();

    if date == local_now.date() {
        return Ok(drop_elapsed(slots, local_now.time()));
    }
    Ok(slots)
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(professional_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&query.date)?;
    find_professional(&state, &professional_id).await?;

    let slots = load_bookable_slots(&state, &professional_id, date, None).await?;
    debug!("{} bookable slots for {} on {}", slots.len(), professional_id, date);

    Ok(Json(SlotsResponse { professional_id, date, slots }))
}

pub async fn list_overrides(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(professional_id): Path<String>,
    Query(query): Query<OverrideRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !caller.can_manage(&professional_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }

    let start = parse_date(&query.start)?;
    let end = parse_date(&query.end)?;
    if end < start {
        return Err(AppError::Validation("end must not be before start".into()));
    }

    let overrides: Vec<AvailabilityOverrideView> = state.availability_repo
        .list_by_range(&professional_id, start, end).await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(overrides))
}

pub async fn upsert_override(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path((professional_id, date)): Path<(String, String)>,
    Json(payload): Json<UpsertOverrideRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !caller.can_manage(&professional_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }
    find_professional(&state, &professional_id).await?;
    let date = parse_date(&date)?;

    if let Some(bad) = payload.slots.iter().find(|s| parse_hhmm(&s.time).is_none()) {
        return Err(AppError::Validation(format!("Invalid slot time '{}', expected HH:MM", bad.time)));
    }

    let entity = AvailabilityOverride::new(professional_id, date, payload.is_closed, &payload.slots)
        .map_err(|e| {
            error!("Failed to serialize override slots: {}", e);
            AppError::Internal
        })?;
    let saved = state.availability_repo.upsert(&entity).await?;

    info!("Availability override saved for {} on {}", saved.professional_id, saved.date);

    Ok(Json(AvailabilityOverrideView::from(saved)))
}

pub async fn delete_override(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path((professional_id, date)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    if !caller.can_manage(&professional_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }
    let date = parse_date(&date)?;

    state.availability_repo.delete(&professional_id, date).await?;

    Ok(StatusCode::NO_CONTENT)
}
