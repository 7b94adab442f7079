use crate::domain::models::availability::SlotOverride;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    /// Honoured only when an admin creates the account.
    pub is_verified: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct BanRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub professional_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListServicesQuery {
    pub professional_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
}

#[derive(Deserialize)]
pub struct OverrideRangeQuery {
    pub start: String,
    pub end: String,
}

#[derive(Deserialize)]
pub struct UpsertOverrideRequest {
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub slots: Vec<SlotOverride>,
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub professional_id: String,
    pub service_id: Option<String>,
    pub date: String,
    #[serde(alias = "time")]
    pub start_time: String,
    pub notes: Option<String>,
    /// Required when an admin books on behalf of a client.
    pub client_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    pub date: Option<String>,
    #[serde(alias = "time")]
    pub start_time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct AppointmentListQuery {
    pub date: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUnbanRequest {
    pub email: String,
    pub password: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct RejectUnbanRequest {
    pub response: Option<String>,
}

#[derive(Deserialize)]
pub struct UnbanListQuery {
    pub status: Option<String>,
}
