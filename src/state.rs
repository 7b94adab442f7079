use std::sync::Arc;
use crate::domain::ports::{
    UserRepository, ServiceRepository, ScheduleRepository,
    AvailabilityRepository, AppointmentRepository, UnbanRequestRepository,
    JobRepository, EmailService,
};
use crate::domain::services::auth_service::AuthService;
use crate::config::Config;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub availability_repo: Arc<dyn AvailabilityRepository>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
    pub unban_repo: Arc<dyn UnbanRequestRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub auth_service: Arc<AuthService>,
    pub email_service: Arc<dyn EmailService>,
    pub templates: Arc<Tera>,
}
