use crate::domain::{models::schedule::ProfessionalSchedule, ports::ScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteScheduleRepo {
    pool: SqlitePool,
}

impl SqliteScheduleRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepo {
    async fn find(&self, professional_id: &str) -> Result<Option<ProfessionalSchedule>, AppError> {
        sqlx::query_as::<_, ProfessionalSchedule>("SELECT * FROM schedules WHERE professional_id = ?")
            .bind(professional_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn upsert(&self, schedule: &ProfessionalSchedule) -> Result<ProfessionalSchedule, AppError> {
        sqlx::query_as::<_, ProfessionalSchedule>(
            r#"INSERT INTO schedules (professional_id, config_json, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT(professional_id) DO UPDATE SET
               config_json=excluded.config_json,
               updated_at=excluded.updated_at
               RETURNING *"#
        )
            .bind(&schedule.professional_id)
            .bind(&schedule.config_json)
            .bind(schedule.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
