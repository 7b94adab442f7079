use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Service {
    pub id: String,
    pub professional_id: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Service {
    pub fn new(professional_id: String, name: String, description: String, price_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            professional_id,
            name,
            description,
            price_cents,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
