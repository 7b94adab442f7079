#![allow(dead_code)]

use booked_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::user::{Role, User},
    domain::ports::EmailService,
    domain::services::auth_service::hash_password,
    infra::factory::build_state,
    background::process_due_jobs,
    error::AppError,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use tower::ServiceExt;
use serde_json::Value;

pub const PASSWORD: &str = "correct-horse-battery";

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachment_name: Option<String>,
    pub attachment_data: Option<Vec<u8>>,
}

#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            attachment_name: attachment_name.map(str::to_string),
            attachment_data: attachment_data.map(<[u8]>::to_vec),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub mailer: Arc<MockEmailService>,
}

pub fn test_config(db_url: &str) -> Config {
    Config {
        database_url: db_url.to_string(),
        port: 0,
        mail_service_url: "http://localhost".to_string(),
        mail_service_token: "token".to_string(),
        jwt_secret_key: include_str!("../tests/keys/test_private.pem").to_string(),
        jwt_public_key: include_str!("../tests/keys/test_public.pem").to_string(),
        auth_issuer: "test-issuer".to_string(),
        business_timezone: chrono_tz::UTC,
        app_url: "http://app.test".to_string(),
        admin_email: None,
        admin_password: None,
        job_poll_interval_ms: 100,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let mut config = test_config(&format!("sqlite://{}", db_filename));
        customize(&mut config);

        let mailer = Arc::new(MockEmailService::default());
        let state = build_state(&config, mailer.clone())
            .await
            .expect("Failed to build test state");
        let state = Arc::new(state);

        let router = create_router(state.clone());

        Self { router, db_filename, state, mailer }
    }

    /// Sends a request and returns the status plus the JSON body (Null when empty).
    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, None).await
    }

    /// Inserts a verified user directly, bypassing registration.
    pub async fn create_user(&self, name: &str, email: &str, role: Role) -> User {
        let mut user = User::new(name.to_string(), email.to_string(), hash_password(PASSWORD).unwrap(), role);
        user.is_verified = true;
        self.state.user_repo.create(&user).await.unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self.post(
            "/api/v1/auth/login",
            None,
            serde_json::json!({ "email": email, "password": password }),
        ).await;

        if status != StatusCode::OK {
            panic!("Login failed in test helper: status {} body {}", status, body);
        }
        body["token"].as_str().expect("No token in body").to_string()
    }

    pub async fn user_with_token(&self, name: &str, email: &str, role: Role) -> (User, String) {
        let user = self.create_user(name, email, role).await;
        let token = self.login(email, PASSWORD).await;
        (user, token)
    }

    pub async fn admin(&self) -> (User, String) {
        self.user_with_token("Admin", "admin@booked.test", Role::Admin).await
    }

    pub async fn professional(&self) -> (User, String) {
        self.user_with_token("Dr. Pro", "pro@booked.test", Role::Professional).await
    }

    pub async fn client(&self) -> (User, String) {
        self.user_with_token("Casey Client", "client@booked.test", Role::Client).await
    }

    /// Saves a schedule that opens only on Mondays between `start` and `end`.
    pub async fn set_monday_hours(&self, professional_id: &str, token: &str, start: &str, end: &str) {
        let closed = serde_json::json!({ "isOpen": false, "start": "09:00", "end": "17:00" });
        let (status, body) = self.put(
            &format!("/api/v1/professionals/{}/schedule", professional_id),
            Some(token),
            serde_json::json!({
                "monday": { "isOpen": true, "start": start, "end": end },
                "tuesday": closed, "wednesday": closed, "thursday": closed,
                "friday": closed, "saturday": closed, "sunday": closed,
            }),
        ).await;
        assert_eq!(status, StatusCode::OK, "schedule update failed: {}", body);
    }

    pub async fn book(&self, token: &str, professional_id: &str, date: NaiveDate, start: &str) -> (StatusCode, Value) {
        self.post(
            "/api/v1/appointments",
            Some(token),
            serde_json::json!({ "professional_id": professional_id, "date": date.to_string(), "start_time": start }),
        ).await
    }

    pub async fn run_jobs(&self) -> usize {
        process_due_jobs(&self.state).await
    }

    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.mailer.sent.lock().unwrap().clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.db_filename, suffix));
        }
    }
}

/// First Monday strictly after today, at least `weeks_ahead` weeks out.
pub fn future_monday(weeks_ahead: i64) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(1);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date + Duration::weeks(weeks_ahead)
}
