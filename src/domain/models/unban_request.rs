use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const UNBAN_PENDING: &str = "pending";
pub const UNBAN_APPROVED: &str = "approved";
pub const UNBAN_REJECTED: &str = "rejected";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct UnbanRequest {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub status: String,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl UnbanRequest {
    pub fn new(user_id: String, message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            message,
            status: UNBAN_PENDING.to_string(),
            admin_response: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == UNBAN_PENDING
    }
}
