use crate::domain::models::{
    user::User, service::Service, schedule::ProfessionalSchedule,
    availability::AvailabilityOverride, appointment::Appointment,
    unban_request::UnbanRequest, job::Job, auth::RefreshTokenRecord,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list(&self, role: Option<&str>) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn set_verification(&self, id: &str, is_verified: bool, code: Option<String>) -> Result<(), AppError>;
    async fn set_ban(&self, id: &str, is_banned: bool, reason: Option<String>) -> Result<User, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
    async fn delete_for_user(&self, user_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Service>, AppError>;
    async fn list(&self, professional_id: Option<&str>, active_only: bool) -> Result<Vec<Service>, AppError>;
    async fn update(&self, service: &Service) -> Result<Service, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn find(&self, professional_id: &str) -> Result<Option<ProfessionalSchedule>, AppError>;
    async fn upsert(&self, schedule: &ProfessionalSchedule) -> Result<ProfessionalSchedule, AppError>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn upsert(&self, entity: &AvailabilityOverride) -> Result<AvailabilityOverride, AppError>;
    async fn find_by_date(&self, professional_id: &str, date: NaiveDate) -> Result<Option<AvailabilityOverride>, AppError>;
    async fn list_by_range(&self, professional_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<AvailabilityOverride>, AppError>;
    async fn delete(&self, professional_id: &str, date: NaiveDate) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Inserts the appointment and its notification jobs in one transaction.
    async fn create_with_jobs(&self, appointment: &Appointment, jobs: Vec<Job>) -> Result<Appointment, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, AppError>;
    async fn list_by_client(&self, client_id: &str) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_professional(&self, professional_id: &str, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError>;
    async fn list_all(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError>;
    /// Appointments that still hold a slot on the given day.
    async fn list_active_for_day(&self, professional_id: &str, date: NaiveDate) -> Result<Vec<Appointment>, AppError>;
    /// Writes date, times and notes. Never touches `status`; fails with `Conflict`
    /// once the appointment is cancelled or completed.
    async fn update_details(&self, appointment: &Appointment) -> Result<Appointment, AppError>;
    /// Moves `from` to `to` only if the stored status is still `from`, else `Conflict`.
    async fn transition_status(&self, id: &str, from: &str, to: &str, at: DateTime<Utc>) -> Result<Appointment, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait UnbanRequestRepository: Send + Sync {
    async fn create(&self, request: &UnbanRequest) -> Result<UnbanRequest, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<UnbanRequest>, AppError>;
    async fn find_pending_for_user(&self, user_id: &str) -> Result<Option<UnbanRequest>, AppError>;
    async fn list(&self, status: Option<&str>) -> Result<Vec<UnbanRequest>, AppError>;
    async fn resolve(&self, id: &str, status: &str, admin_response: Option<String>, resolved_at: DateTime<Utc>) -> Result<UnbanRequest, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, AppError>;
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
    async fn cancel_jobs_for_subject(&self, subject_id: &str, job_type: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str, attachment_name: Option<&str>, attachment_data: Option<&[u8]>) -> Result<(), AppError>;
}
