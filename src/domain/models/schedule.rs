use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc, Weekday};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    #[serde(rename = "isOpen", alias = "is_open")]
    pub is_open: bool,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WeeklySchedule {
    pub monday: Option<DaySchedule>,
    pub tuesday: Option<DaySchedule>,
    pub wednesday: Option<DaySchedule>,
    pub thursday: Option<DaySchedule>,
    pub friday: Option<DaySchedule>,
    pub saturday: Option<DaySchedule>,
    pub sunday: Option<DaySchedule>,
}

impl WeeklySchedule {
    pub fn day(&self, weekday: Weekday) -> Option<&DaySchedule> {
        match weekday {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }

    pub fn days(&self) -> [(Weekday, Option<&DaySchedule>); 7] {
        [
            (Weekday::Mon, self.monday.as_ref()),
            (Weekday::Tue, self.tuesday.as_ref()),
            (Weekday::Wed, self.wednesday.as_ref()),
            (Weekday::Thu, self.thursday.as_ref()),
            (Weekday::Fri, self.friday.as_ref()),
            (Weekday::Sat, self.saturday.as_ref()),
            (Weekday::Sun, self.sunday.as_ref()),
        ]
    }
}

/// Stored row. The schedule itself lives in `config_json`.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ProfessionalSchedule {
    pub professional_id: String,
    pub config_json: String,
    pub updated_at: DateTime<Utc>,
}

impl ProfessionalSchedule {
    pub fn new(professional_id: String, schedule: &WeeklySchedule) -> Result<Self, serde_json::Error> {
        Ok(Self {
            professional_id,
            config_json: serde_json::to_string(schedule)?,
            updated_at: Utc::now(),
        })
    }

    /// Corrupt JSON degrades to an empty schedule, which the slot
    /// computation treats as the default window.
    pub fn schedule(&self) -> WeeklySchedule {
        serde_json::from_str(&self.config_json).unwrap_or_default()
    }
}
