use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const JOB_VERIFY_EMAIL: &str = "VERIFY_EMAIL";
pub const JOB_APPOINTMENT_CREATED: &str = "APPOINTMENT_CREATED";
pub const JOB_APPOINTMENT_STATUS: &str = "APPOINTMENT_STATUS";
pub const JOB_REMINDER: &str = "REMINDER";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobPayload {
    /// User id for account mails, appointment id for everything else.
    pub subject_id: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Job {
    pub id: String,
    pub job_type: String,
    pub payload: Json<JobPayload>,
    pub execute_at: DateTime<Utc>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(job_type: &str, subject_id: String, execute_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_type: job_type.to_string(),
            payload: Json(JobPayload { subject_id }),
            execute_at,
            status: "PENDING".to_string(),
            error_message: None,
            created_at: Utc::now(),
        }
    }
}
