use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SlotOverride {
    pub time: String,
    pub available: bool,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityOverride {
    pub id: String,
    pub professional_id: String,
    pub date: NaiveDate,
    pub is_closed: bool,
    #[serde(skip_serializing)]
    pub slots_json: String,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityOverride {
    pub fn new(professional_id: String, date: NaiveDate, is_closed: bool, slots: &[SlotOverride]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            professional_id,
            date,
            is_closed,
            slots_json: serde_json::to_string(slots)?,
            created_at: Utc::now(),
        })
    }

    pub fn slots(&self) -> Vec<SlotOverride> {
        serde_json::from_str(&self.slots_json).unwrap_or_default()
    }
}

#[derive(Serialize)]
pub struct AvailabilityOverrideView {
    pub id: String,
    pub professional_id: String,
    pub date: NaiveDate,
    pub is_closed: bool,
    pub slots: Vec<SlotOverride>,
}

impl From<AvailabilityOverride> for AvailabilityOverrideView {
    fn from(o: AvailabilityOverride) -> Self {
        let slots = o.slots();
        Self {
            id: o.id,
            professional_id: o.professional_id,
            date: o.date,
            is_closed: o.is_closed,
            slots,
        }
    }
}
