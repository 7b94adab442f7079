use crate::domain::{models::unban_request::UnbanRequest, ports::UnbanRequestRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqliteUnbanRequestRepo {
    pool: SqlitePool,
}

impl SqliteUnbanRequestRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl UnbanRequestRepository for SqliteUnbanRequestRepo {
    async fn create(&self, request: &UnbanRequest) -> Result<UnbanRequest, AppError> {
        sqlx::query_as::<_, UnbanRequest>(
            "INSERT INTO unban_requests (id, user_id, message, status, admin_response, created_at, resolved_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&request.id)
            .bind(&request.user_id)
            .bind(&request.message)
            .bind(&request.status)
            .bind(&request.admin_response)
            .bind(request.created_at)
            .bind(request.resolved_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UnbanRequest>, AppError> {
        sqlx::query_as::<_, UnbanRequest>("SELECT * FROM unban_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_pending_for_user(&self, user_id: &str) -> Result<Option<UnbanRequest>, AppError> {
        sqlx::query_as::<_, UnbanRequest>(
            "SELECT * FROM unban_requests WHERE user_id = ? AND status = 'pending' LIMIT 1"
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, status: Option<&str>) -> Result<Vec<UnbanRequest>, AppError> {
        sqlx::query_as::<_, UnbanRequest>(
            "SELECT * FROM unban_requests WHERE (? IS NULL OR status = ?) ORDER BY created_at DESC"
        )
            .bind(status)
            .bind(status)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn resolve(&self, id: &str, status: &str, admin_response: Option<String>, resolved_at: DateTime<Utc>) -> Result<UnbanRequest, AppError> {
        // Only pending requests can be resolved; a lost race surfaces as a conflict.
        sqlx::query_as::<_, UnbanRequest>(
            "UPDATE unban_requests SET status = ?, admin_response = ?, resolved_at = ?
             WHERE id = ? AND status = 'pending'
             RETURNING *"
        )
            .bind(status)
            .bind(admin_response)
            .bind(resolved_at)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Unban request already resolved".into()))
    }
}
