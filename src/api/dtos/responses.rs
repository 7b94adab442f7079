use crate::domain::models::schedule::WeeklySchedule;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize)]
pub struct SlotsResponse {
    pub professional_id: String,
    pub date: NaiveDate,
    pub slots: Vec<String>,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    pub professional_id: String,
    pub schedule: WeeklySchedule,
    /// True when the professional never saved a schedule.
    pub is_default: bool,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
