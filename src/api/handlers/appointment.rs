use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::{AuthUser, AdminUser};
use crate::api::dtos::requests::{CreateAppointmentRequest, UpdateAppointmentRequest, UpdateStatusRequest, AppointmentListQuery};
use crate::api::handlers::availability::{find_professional, load_bookable_slots, parse_date};
use crate::domain::models::appointment::{Appointment, AppointmentStatus, NewAppointmentParams};
use crate::domain::models::job::{Job, JOB_APPOINTMENT_STATUS, JOB_REMINDER};
use crate::domain::models::user::{Role, User};
use crate::domain::ports::AppointmentFilter;
use crate::domain::services::availability::{format_hhmm, parse_hhmm, slot_end};
use crate::domain::services::calendar::local_to_utc;
use crate::domain::services::notifications::{jobs_for_new_appointment, reminder_job};
use crate::error::AppError;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

fn parse_start(raw: &str) -> Result<String, AppError> {
    parse_hhmm(raw)
        .map(format_hhmm)
        .ok_or(AppError::Validation(format!("Invalid time '{}', expected HH:MM", raw)))
}

fn end_of(start: &str) -> Result<String, AppError> {
    let start = parse_hhmm(start).ok_or(AppError::Internal)?;
    Ok(format_hhmm(slot_end(start)))
}

/// Rejects start times that are already over or do not exist in the business timezone.
fn ensure_in_future(state: &AppState, date: NaiveDate, start: &str) -> Result<(), AppError> {
    let starts_at = local_to_utc(state.config.business_timezone, date, start)
        .ok_or(AppError::Validation(format!("{} {} does not exist in the business timezone", date, start)))?;
    if starts_at <= Utc::now() {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }
    Ok(())
}

fn parse_filter(query: AppointmentListQuery) -> Result<AppointmentFilter, AppError> {
    let date = query.date.as_deref().map(parse_date).transpose()?;
    let status = match query.status {
        Some(raw) => Some(raw.parse::<AppointmentStatus>().map_err(AppError::Validation)?.as_str().to_string()),
        None => None,
    };
    Ok(AppointmentFilter { date, status })
}

async fn find_appointment(state: &AppState, id: &str) -> Result<Appointment, AppError> {
    state.appointment_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Appointment not found".into()))
}

fn ensure_participant(caller: &User, appointment: &Appointment) -> Result<(), AppError> {
    if caller.is_admin() || appointment.involves(&caller.id) {
        return Ok(());
    }
    Err(AppError::Forbidden("Access denied".into()))
}

/// Drops the pending reminder and queues a new one for the current start time.
async fn reschedule_reminder(state: &AppState, appointment: &Appointment) -> Result<(), AppError> {
    state.job_repo.cancel_jobs_for_subject(&appointment.id, JOB_REMINDER).await?;
    if let Some(job) = reminder_job(appointment, state.config.business_timezone, Utc::now()) {
        state.job_repo.create(&job).await?;
    }
    Ok(())
}

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client_id = match caller.role() {
        Role::Client => {
            if payload.client_id.as_deref().is_some_and(|id| id != caller.id) {
                return Err(AppError::Forbidden("Clients can only book for themselves".into()));
            }
            caller.id.clone()
        }
        Role::Admin => {
            let client_id = payload.client_id
                .ok_or(AppError::Validation("client_id is required when booking on behalf of a client".into()))?;
            let client = state.user_repo.find_by_id(&client_id).await?
                .ok_or(AppError::NotFound("Client not found".into()))?;
            if client.role() != Role::Client {
                return Err(AppError::Validation("Appointments can only be booked for clients".into()));
            }
            client_id
        }
        Role::Professional => return Err(AppError::Forbidden("Only clients can book appointments".into())),
    };

    let professional = find_professional(&state, &payload.professional_id).await?;
    if professional.is_banned {
        return Err(AppError::Conflict("This professional is not accepting bookings".into()));
    }

    if let Some(service_id) = payload.service_id.as_deref() {
        let service = state.service_repo.find_by_id(service_id).await?
            .ok_or(AppError::NotFound("Service not found".into()))?;
        if service.professional_id != professional.id {
            return Err(AppError::Validation("Service is not offered by this professional".into()));
        }
        if !service.is_active {
            return Err(AppError::Conflict("Service is no longer offered".into()));
        }
    }

    let date = parse_date(&payload.date)?;
    let start_time = parse_start(&payload.start_time)?;
    ensure_in_future(&state, date, &start_time)?;

    let slots = load_bookable_slots(&state, &professional.id, date, None).await?;
    if !slots.contains(&start_time) {
        warn!("Booking rejected: {} {} not bookable for {}", date, start_time, professional.id);
        return Err(AppError::Conflict("Selected time slot is not available".into()));
    }

    let appointment = Appointment::new(NewAppointmentParams {
        client_id,
        professional_id: professional.id.clone(),
        service_id: payload.service_id,
        date,
        end_time: end_of(&start_time)?,
        start_time,
        notes: payload.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
    });

    let jobs = jobs_for_new_appointment(&appointment, state.config.business_timezone, Utc::now());
    let created = state.appointment_repo.create_with_jobs(&appointment, jobs).await?;

    info!("Appointment created: {} ({} {} with {})", created.id, created.date, created.start_time, created.professional_id);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(appointment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = find_appointment(&state, &appointment_id).await?;
    ensure_participant(&caller, &appointment)?;
    Ok(Json(appointment))
}

pub async fn list_for_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let appointments = if caller.is_professional() {
        state.appointment_repo.list_by_professional(&caller.id, &AppointmentFilter::default()).await?
    } else {
        state.appointment_repo.list_by_client(&caller.id).await?
    };
    Ok(Json(appointments))
}

pub async fn list_for_professional(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(professional_id): Path<String>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !caller.can_manage(&professional_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }
    let filter = parse_filter(query)?;
    Ok(Json(state.appointment_repo.list_by_professional(&professional_id, &filter).await?))
}

pub async fn list_all(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<AppointmentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = parse_filter(query)?;
    Ok(Json(state.appointment_repo.list_all(&filter).await?))
}

pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(appointment_id): Path<String>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut appointment = find_appointment(&state, &appointment_id).await?;
    ensure_participant(&caller, &appointment)?;

    if appointment.status().is_terminal() {
        return Err(AppError::Conflict(format!("Cannot modify a {} appointment", appointment.status)));
    }

    if let Some(notes) = payload.notes {
        appointment.notes = Some(notes.trim().to_string()).filter(|n| !n.is_empty());
    }

    let new_date = payload.date.as_deref().map(parse_date).transpose()?.unwrap_or(appointment.date);
    let new_start = payload.start_time.as_deref().map(parse_start).transpose()?
        .unwrap_or_else(|| appointment.start_time.clone());
    let rescheduled = new_date != appointment.date || new_start != appointment.start_time;

    if rescheduled {
        ensure_in_future(&state, new_date, &new_start)?;

        let slots = load_bookable_slots(&state, &appointment.professional_id, new_date, Some(&appointment.id)).await?;
        if !slots.contains(&new_start) {
            return Err(AppError::Conflict("Selected time slot is not available".into()));
        }

        appointment.end_time = end_of(&new_start)?;
        appointment.date = new_date;
        appointment.start_time = new_start;
    }

    appointment.updated_at = Utc::now();
    let updated = state.appointment_repo.update_details(&appointment).await?;

    if rescheduled {
        reschedule_reminder(&state, &updated).await?;
        info!("Appointment {} rescheduled to {} {}", updated.id, updated.date, updated.start_time);
    }

    Ok(Json(updated))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(appointment_id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let next: AppointmentStatus = payload.status.parse().map_err(AppError::Validation)?;
    let appointment = find_appointment(&state, &appointment_id).await?;

    let manages = caller.is_admin() || appointment.professional_id == caller.id;
    let owns = appointment.client_id == caller.id;
    if !manages && !(owns && next == AppointmentStatus::Cancelled) {
        return Err(AppError::Forbidden("Not allowed to change this appointment's status".into()));
    }

    let current = appointment.status();
    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!("Cannot change status from {} to {}", current, next)));
    }

    let updated = state.appointment_repo
        .transition_status(&appointment.id, &appointment.status, next.as_str(), Utc::now())
        .await?;

    state.job_repo.create(&Job::new(JOB_APPOINTMENT_STATUS, updated.id.clone(), Utc::now())).await?;
    if next.is_terminal() {
        state.job_repo.cancel_jobs_for_subject(&updated.id, JOB_REMINDER).await?;
    }

    info!("Appointment {} moved from {} to {} by {}", updated.id, current, next, caller.id);

    Ok(Json(updated))
}

pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(appointment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    find_appointment(&state, &appointment_id).await?;

    state.job_repo.cancel_jobs_for_subject(&appointment_id, JOB_REMINDER).await?;
    state.appointment_repo.delete(&appointment_id).await?;

    info!("Admin {} deleted appointment {}", admin.id, appointment_id);

    Ok(StatusCode::NO_CONTENT)
}
