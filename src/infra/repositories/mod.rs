pub mod sqlite_user_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_service_repo;
pub mod sqlite_schedule_repo;
pub mod sqlite_availability_repo;
pub mod sqlite_appointment_repo;
pub mod sqlite_unban_request_repo;
pub mod sqlite_job_repo;

pub mod postgres_user_repo;
pub mod postgres_auth_repo;
pub mod postgres_service_repo;
pub mod postgres_schedule_repo;
pub mod postgres_availability_repo;
pub mod postgres_appointment_repo;
pub mod postgres_unban_request_repo;
pub mod postgres_job_repo;
