use crate::domain::{
    models::{appointment::Appointment, job::Job},
    ports::{AppointmentFilter, AppointmentRepository},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::{DateTime, NaiveDate, Utc};

pub struct PostgresAppointmentRepo {
    pool: PgPool,
}

impl PostgresAppointmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepo {
    async fn create_with_jobs(&self, appointment: &Appointment, jobs: Vec<Job>) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (id, client_id, professional_id, service_id, date, start_time, end_time, status, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *"
        )
            .bind(&appointment.id).bind(&appointment.client_id).bind(&appointment.professional_id).bind(&appointment.service_id)
            .bind(appointment.date).bind(&appointment.start_time).bind(&appointment.end_time).bind(&appointment.status)
            .bind(&appointment.notes).bind(appointment.created_at).bind(appointment.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for job in jobs {
            sqlx::query("INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
                .bind(&job.id).bind(&job.job_type).bind(&job.payload).bind(job.execute_at)
                .bind(&job.status).bind(&job.error_message).bind(job.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_client(&self, client_id: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE client_id = $1 ORDER BY date ASC, start_time ASC")
            .bind(client_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_professional(&self, professional_id: &str, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments
             WHERE professional_id = $1 AND ($2::DATE IS NULL OR date = $2) AND ($3::TEXT IS NULL OR status = $3)
             ORDER BY date ASC, start_time ASC"
        )
            .bind(professional_id)
            .bind(filter.date)
            .bind(&filter.status)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_all(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments
             WHERE ($1::DATE IS NULL OR date = $1) AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY date ASC, start_time ASC"
        )
            .bind(filter.date)
            .bind(&filter.status)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_for_day(&self, professional_id: &str, date: NaiveDate) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments
             WHERE professional_id = $1 AND date = $2 AND status IN ('pending', 'scheduled', 'confirmed')
             ORDER BY start_time ASC"
        )
            .bind(professional_id).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_details(&self, appointment: &Appointment) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET date=$1, start_time=$2, end_time=$3, notes=$4, updated_at=$5
             WHERE id=$6 AND status NOT IN ('cancelled', 'completed')
             RETURNING *"
        )
            .bind(appointment.date).bind(&appointment.start_time).bind(&appointment.end_time)
            .bind(&appointment.notes).bind(appointment.updated_at)
            .bind(&appointment.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Appointment was closed before the change was saved".into()))
    }

    async fn transition_status(&self, id: &str, from: &str, to: &str, at: DateTime<Utc>) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status=$1, updated_at=$2
             WHERE id=$3 AND status=$4
             RETURNING *"
        )
            .bind(to).bind(at).bind(id).bind(from)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict(format!("Appointment is no longer {}", from)))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Appointment not found".into())); }
        Ok(())
    }
}
