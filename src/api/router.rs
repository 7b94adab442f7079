use axum::{
    body::Body,
    extract::Request,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, auth, user, service, schedule, availability, appointment, unban};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/verify-email", post(auth::verify_email))
        .route("/api/v1/auth/resend-verification", post(auth::resend_verification))

        // Users
        .route("/api/v1/users", post(user::register).get(user::list_users))
        .route("/api/v1/users/{user_id}", get(user::get_user).put(user::update_user).delete(user::delete_user))
        .route("/api/v1/users/{user_id}/ban", post(user::ban_user))
        .route("/api/v1/users/{user_id}/unban", post(user::unban_user))

        // Services
        .route("/api/v1/services", get(service::list_services).post(service::create_service))
        .route("/api/v1/services/{service_id}", get(service::get_service).put(service::update_service).delete(service::delete_service))

        // Schedules & availability
        .route("/api/v1/professionals/{professional_id}/schedule", get(schedule::get_schedule).put(schedule::update_schedule))
        .route("/api/v1/availability/{professional_id}", get(availability::get_slots))
        .route("/api/v1/availability/{professional_id}/overrides", get(availability::list_overrides))
        .route("/api/v1/availability/{professional_id}/{date}", put(availability::upsert_override).delete(availability::delete_override))

        // Appointments
        .route("/api/v1/appointments", post(appointment::create_appointment).get(appointment::list_all))
        .route("/api/v1/appointments/user", get(appointment::list_for_user))
        .route("/api/v1/appointments/professional/{professional_id}", get(appointment::list_for_professional))
        .route("/api/v1/appointments/{appointment_id}", get(appointment::get_appointment).put(appointment::update_appointment).delete(appointment::delete_appointment))
        .route("/api/v1/appointments/{appointment_id}/status", patch(appointment::update_status))

        // Unban requests
        .route("/api/v1/unban-requests", post(unban::create_request).get(unban::list_requests))
        .route("/api/v1/unban-requests/{request_id}/approve", post(unban::approve_request))
        .route("/api/v1/unban-requests/{request_id}/reject", post(unban::reject_request))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
