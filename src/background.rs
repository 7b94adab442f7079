use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn, info_span, Instrument};
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::models::{appointment::{Appointment, AppointmentStatus}, job::*, user::User};
use crate::domain::services::calendar::generate_ics;
use crate::domain::services::notifications::template_for;

const JOB_BATCH_SIZE: i32 = 10;

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background job worker...");
    let interval = Duration::from_millis(state.config.job_poll_interval_ms);

    loop {
        process_due_jobs(&state).await;
        sleep(interval).await;
    }
}

/// Claims one batch of due jobs and runs them. Returns how many were claimed.
pub async fn process_due_jobs(state: &Arc<AppState>) -> usize {
    let jobs = match state.job_repo.find_pending(JOB_BATCH_SIZE).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!("Failed to fetch pending jobs: {:?}", e);
            return 0;
        }
    };

    let claimed = jobs.len();
    for job in jobs {
        let span = info_span!(
            "background_job",
            job_id = %job.id,
            job_type = %job.job_type,
            subject_id = %job.payload.subject_id
        );

        async {
            info!("Processing job");
            match process_job(state, &job).await {
                Ok(_) => {
                    info!("Job completed successfully");
                    if let Err(e) = state.job_repo.update_status(&job.id, "COMPLETED", None).await {
                        error!("Failed to mark job as completed: {:?}", e);
                    }
                },
                Err(e) => {
                    let err_msg = format!("{}", e);
                    error!("Job failed with error: {}", err_msg);
                    if let Err(up_err) = state.job_repo.update_status(&job.id, "FAILED", Some(err_msg)).await {
                        error!("Failed to mark job as failed: {:?}", up_err);
                    }
                }
            }
        }
            .instrument(span)
            .await;
    }
    claimed
}

async fn process_job(state: &Arc<AppState>, job: &Job) -> Result<(), AppError> {
    let (template, subject) = template_for(&job.job_type)
        .ok_or_else(|| AppError::InternalWithMsg(format!("Unknown job type {}", job.job_type)))?;
    let subject_id = &job.payload.subject_id;

    if job.job_type == JOB_VERIFY_EMAIL {
        let user = find_user(state, subject_id).await?;
        let Some(code) = user.verification_code.as_deref().filter(|_| !user.is_verified) else {
            info!("User {} already verified, skipping mail", user.id);
            return Ok(());
        };

        let mut context = tera::Context::new();
        context.insert("user_name", &user.name);
        context.insert("code", code);
        context.insert("app_url", &state.config.app_url);

        let html = render(state, template, &context)?;
        return state.email_service.send(&user.email, subject, &html, None, None).await;
    }

    let appointment = state.appointment_repo.find_by_id(subject_id).await?
        .ok_or(AppError::NotFound(format!("Appointment {} not found", subject_id)))?;
    let client = find_user(state, &appointment.client_id).await?;
    let professional = find_user(state, &appointment.professional_id).await?;

    let service_name = match &appointment.service_id {
        Some(id) => state.service_repo.find_by_id(id).await?.map(|s| s.name),
        None => None,
    };

    let context = appointment_context(state, &appointment, &client, &professional, service_name.as_deref());

    match job.job_type.as_str() {
        JOB_APPOINTMENT_CREATED => {
            let html = render(state, template, &context)?;
            state.email_service.send(&professional.email, subject, &html, None, None).await
        }
        JOB_APPOINTMENT_STATUS => {
            let html = render(state, template, &context)?;

            let ics = (appointment.status() == AppointmentStatus::Confirmed)
                .then(|| generate_ics(&appointment, &professional, service_name.as_deref(), state.config.business_timezone))
                .flatten();
            let attachment_name = ics.as_ref().map(|_| "invite.ics");

            state.email_service.send(&client.email, subject, &html, attachment_name, ics.as_deref().map(str::as_bytes)).await
        }
        JOB_REMINDER => {
            if !appointment.status().occupies_slot() {
                warn!("Appointment {} is {}, skipping reminder", appointment.id, appointment.status);
                return Ok(());
            }
            let html = render(state, template, &context)?;
            state.email_service.send(&client.email, subject, &html, None, None).await
        }
        other => Err(AppError::InternalWithMsg(format!("Unhandled job type {}", other))),
    }
}

async fn find_user(state: &Arc<AppState>, id: &str) -> Result<User, AppError> {
    state.user_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound(format!("User {} not found", id)))
}

fn appointment_context(state: &AppState, appointment: &Appointment, client: &User, professional: &User, service_name: Option<&str>) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("client_name", &client.name);
    context.insert("professional_name", &professional.name);
    context.insert("service_name", &service_name);
    context.insert("date", &appointment.date.format("%Y-%m-%d").to_string());
    context.insert("start_time", &appointment.start_time);
    context.insert("end_time", &appointment.end_time);
    context.insert("timezone", &state.config.business_timezone.name());
    context.insert("notes", &appointment.notes);
    context.insert("status", &appointment.status);
    context.insert("manage_link", &format!("{}/appointments/{}", state.config.app_url, appointment.id));
    context
}

fn render(state: &AppState, template: &str, context: &tera::Context) -> Result<String, AppError> {
    state.templates.render(template, context).map_err(|e| {
        error!("Tera render error: {:?}", e);
        AppError::InternalWithMsg(format!("Tera render error: {:?}", e))
    })
}
