use crate::domain::{models::availability::AvailabilityOverride, ports::AvailabilityRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::NaiveDate;

pub struct PostgresAvailabilityRepo {
    pool: PgPool,
}

impl PostgresAvailabilityRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl AvailabilityRepository for PostgresAvailabilityRepo {
    async fn upsert(&self, entity: &AvailabilityOverride) -> Result<AvailabilityOverride, AppError> {
        sqlx::query_as::<_, AvailabilityOverride>(
            r#"INSERT INTO availability_overrides (id, professional_id, date, is_closed, slots_json, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT(professional_id, date) DO UPDATE SET
               is_closed=excluded.is_closed,
               slots_json=excluded.slots_json
               RETURNING *"#
        )
            .bind(&entity.id)
            .bind(&entity.professional_id)
            .bind(entity.date)
            .bind(entity.is_closed)
            .bind(&entity.slots_json)
            .bind(entity.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_date(&self, professional_id: &str, date: NaiveDate) -> Result<Option<AvailabilityOverride>, AppError> {
        sqlx::query_as::<_, AvailabilityOverride>(
            "SELECT * FROM availability_overrides WHERE professional_id = $1 AND date = $2"
        )
            .bind(professional_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, professional_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<AvailabilityOverride>, AppError> {
        sqlx::query_as::<_, AvailabilityOverride>(
            "SELECT * FROM availability_overrides WHERE professional_id = $1 AND date >= $2 AND date <= $3 ORDER BY date ASC"
        )
            .bind(professional_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, professional_id: &str, date: NaiveDate) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM availability_overrides WHERE professional_id = $1 AND date = $2")
            .bind(professional_id)
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Override not found".into()));
        }
        Ok(())
    }
}
