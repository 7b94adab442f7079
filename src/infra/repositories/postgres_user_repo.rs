use crate::domain::{models::user::User, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role, is_verified, verification_code, is_banned, ban_reason, phone, bio, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING *",
        )
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.role)
            .bind(user.is_verified)
            .bind(&user.verification_code)
            .bind(user.is_banned)
            .bind(&user.ban_reason)
            .bind(&user.phone)
            .bind(&user.bio)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, role: Option<&str>) -> Result<Vec<User>, AppError> {
        match role {
            Some(role) => sqlx::query_as::<_, User>("SELECT * FROM users WHERE role = $1 ORDER BY name ASC")
                .bind(role)
                .fetch_all(&self.pool)
                .await,
            None => sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await,
        }
        .map_err(AppError::Database)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET name = $1, role = $2, phone = $3, bio = $4 WHERE id = $5 RETURNING *"
        )
            .bind(&user.name)
            .bind(&user.role)
            .bind(&user.phone)
            .bind(&user.bio)
            .bind(&user.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("User not found".into()))
    }

    async fn set_verification(&self, id: &str, is_verified: bool, code: Option<String>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET is_verified = $1, verification_code = $2 WHERE id = $3")
            .bind(is_verified)
            .bind(code)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn set_ban(&self, id: &str, is_banned: bool, reason: Option<String>) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("UPDATE users SET is_banned = $1, ban_reason = $2 WHERE id = $3 RETURNING *")
            .bind(is_banned)
            .bind(reason)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("User not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres User Deletion Failed: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }
}
