use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub mod category_type {
    pub const PHYSICAL: &str = "fisico";
    pub const HUMAN: &str = "humano";
    pub const SOFTWARE: &str = "software";

    pub const ALL: [&str; 3] = [PHYSICAL, HUMAN, SOFTWARE];
}

pub mod resource_status {
    pub const AVAILABLE: &str = "disponivel";
    pub const MAINTENANCE: &str = "manutencao";
    pub const UNAVAILABLE: &str = "indisponivel";

    pub const ALL: [&str; 3] = [AVAILABLE, MAINTENANCE, UNAVAILABLE];
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Category {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category_type: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub category_metadata: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(tenant_id: String, name: String, category_type: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            name,
            description: None,
            category_type,
            icon: None,
            color: None,
            is_active: true,
            category_metadata: "{}".to_string(),
            created_at: Utc::now(),
        }
    }
}

/// `attributes` and `availability_schedule` are JSON columns kept as text;
/// the schedule parses into [`WeekSchedule`] wherever slots are computed.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Resource {
    pub id: String,
    pub tenant_id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub attributes: String,
    pub availability_schedule: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewResourceParams {
    pub tenant_id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub attributes: String,
    pub availability_schedule: String,
    pub image_url: Option<String>,
}

impl Resource {
    pub fn new(params: NewResourceParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: params.tenant_id,
            category_id: params.category_id,
            name: params.name,
            description: params.description,
            status: resource_status::AVAILABLE.to_string(),
            capacity: params.capacity,
            location: params.location,
            attributes: params.attributes,
            availability_schedule: params.availability_schedule,
            image_url: params.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn week_schedule(&self) -> WeekSchedule {
        serde_json::from_str(&self.availability_schedule).unwrap_or_default()
    }
}

/// Weekly opening windows. Each entry is a local-time "HH:MM-HH:MM" range,
/// half-open. A missing day means the resource is closed that day.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WeekSchedule {
    #[serde(default)]
    pub monday: Option<Vec<String>>,
    #[serde(default)]
    pub tuesday: Option<Vec<String>>,
    #[serde(default)]
    pub wednesday: Option<Vec<String>>,
    #[serde(default)]
    pub thursday: Option<Vec<String>>,
    #[serde(default)]
    pub friday: Option<Vec<String>>,
    #[serde(default)]
    pub saturday: Option<Vec<String>>,
    #[serde(default)]
    pub sunday: Option<Vec<String>>,
}

impl WeekSchedule {
    pub fn for_weekday(&self, weekday: chrono::Weekday) -> Option<&Vec<String>> {
        match weekday {
            chrono::Weekday::Mon => self.monday.as_ref(),
            chrono::Weekday::Tue => self.tuesday.as_ref(),
            chrono::Weekday::Wed => self.wednesday.as_ref(),
            chrono::Weekday::Thu => self.thursday.as_ref(),
            chrono::Weekday::Fri => self.friday.as_ref(),
            chrono::Weekday::Sat => self.saturday.as_ref(),
            chrono::Weekday::Sun => self.sunday.as_ref(),
        }
    }
}
