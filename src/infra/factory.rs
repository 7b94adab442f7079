use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::error::{AppError, StartupError};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::domain::models::user::{Role, User};
use crate::domain::ports::{EmailService, UserRepository};
use crate::domain::services::auth_service::{hash_password, AuthService};
use crate::domain::services::notifications::{
    TEMPLATE_APPOINTMENT_CREATED, TEMPLATE_APPOINTMENT_STATUS, TEMPLATE_REMINDER, TEMPLATE_VERIFY_EMAIL,
};
use crate::infra::repositories::{
    postgres_user_repo::PostgresUserRepo, postgres_auth_repo::PostgresAuthRepo,
    postgres_service_repo::PostgresServiceRepo, postgres_schedule_repo::PostgresScheduleRepo,
    postgres_availability_repo::PostgresAvailabilityRepo, postgres_appointment_repo::PostgresAppointmentRepo,
    postgres_unban_request_repo::PostgresUnbanRequestRepo, postgres_job_repo::PostgresJobRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_auth_repo::SqliteAuthRepo,
    sqlite_service_repo::SqliteServiceRepo, sqlite_schedule_repo::SqliteScheduleRepo,
    sqlite_availability_repo::SqliteAvailabilityRepo, sqlite_appointment_repo::SqliteAppointmentRepo,
    sqlite_unban_request_repo::SqliteUnbanRequestRepo, sqlite_job_repo::SqliteJobRepo,
};

/// Built-in notification templates.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (TEMPLATE_VERIFY_EMAIL, include_str!("../templates/verify_email.html")),
        (TEMPLATE_APPOINTMENT_CREATED, include_str!("../templates/appointment_created.html")),
        (TEMPLATE_APPOINTMENT_STATUS, include_str!("../templates/appointment_status.html")),
        (TEMPLATE_REMINDER, include_str!("../templates/reminder.html")),
    ])?;
    Ok(tera)
}

pub async fn bootstrap_state(config: &Config) -> Result<AppState, StartupError> {
    let email_service: Arc<dyn EmailService> = Arc::new(HttpEmailService::from_config(config));
    build_state(config, email_service).await
}

/// Connects the configured backend and wires every repository.
/// The email port is injected so tests can capture outgoing mail.
pub async fn build_state(config: &Config, email_service: Arc<dyn EmailService>) -> Result<AppState, StartupError> {
    let database_url = &config.database_url;
    let templates = Arc::new(load_templates()?);

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let opts: PgConnectOptions = database_url.parse::<PgConnectOptions>()?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await?;

        run_postgres_migrations(&pool).await?;

        let auth_service = Arc::new(AuthService::new(Arc::new(PostgresAuthRepo::new(pool.clone())), config.clone())?);

        AppState {
            config: config.clone(),
            user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
            service_repo: Arc::new(PostgresServiceRepo::new(pool.clone())),
            schedule_repo: Arc::new(PostgresScheduleRepo::new(pool.clone())),
            availability_repo: Arc::new(PostgresAvailabilityRepo::new(pool.clone())),
            appointment_repo: Arc::new(PostgresAppointmentRepo::new(pool.clone())),
            unban_repo: Arc::new(PostgresUnbanRequestRepo::new(pool.clone())),
            job_repo: Arc::new(PostgresJobRepo::new(pool.clone())),
            auth_service,
            email_service,
            templates,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        run_sqlite_migrations(&pool).await?;

        let auth_service = Arc::new(AuthService::new(Arc::new(SqliteAuthRepo::new(pool.clone())), config.clone())?);

        AppState {
            config: config.clone(),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            service_repo: Arc::new(SqliteServiceRepo::new(pool.clone())),
            schedule_repo: Arc::new(SqliteScheduleRepo::new(pool.clone())),
            availability_repo: Arc::new(SqliteAvailabilityRepo::new(pool.clone())),
            appointment_repo: Arc::new(SqliteAppointmentRepo::new(pool.clone())),
            unban_repo: Arc::new(SqliteUnbanRequestRepo::new(pool.clone())),
            job_repo: Arc::new(SqliteJobRepo::new(pool.clone())),
            auth_service,
            email_service,
            templates,
        }
    };

    seed_admin(config, state.user_repo.as_ref()).await?;
    Ok(state)
}

/// Creates the bootstrap admin from ADMIN_EMAIL / ADMIN_PASSWORD if it does not exist yet.
async fn seed_admin(config: &Config, users: &dyn UserRepository) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    if let Some(existing) = users.find_by_email(&email.trim().to_lowercase()).await? {
        if !existing.is_admin() {
            warn!("ADMIN_EMAIL {} belongs to a non-admin account, not promoting", existing.email);
        }
        return Ok(());
    }

    let mut admin = User::new("Administrator".into(), email.clone(), hash_password(password)?, Role::Admin);
    admin.is_verified = true;
    users.create(&admin).await?;

    info!("Seeded admin account {}", admin.email);
    Ok(())
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
}
