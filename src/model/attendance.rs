use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of the backend's period attendance table. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAttendanceRecord {
    pub id: u64,
    pub student_id: String,
    pub name: String,
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub date: String,
    #[schema(example = "1st Period (9:00-10:00)")]
    pub period: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[schema(example = "LIVE")]
    #[serde(default)]
    pub spoofing_status: Option<String>,
    #[serde(default)]
    pub liveness_confidence: Option<f32>,
    #[serde(default)]
    pub recognition_confidence: Option<f32>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub period: String,
    pub total_present: u32,
    pub live_count: u32,
    pub spoofed_count: u32,
}

/// Class time-slots the backend scopes attendance by.
pub const PERIODS: [&str; 6] = [
    "1st Period (9:00-10:00)",
    "2nd Period (10:00-11:00)",
    "3rd Period (11:00-12:00)",
    "4th Period (12:00-1:00)",
    "5th Period (2:00-3:00)",
    "6th Period (3:00-4:00)",
];

pub fn is_known_period(label: &str) -> bool {
    PERIODS.contains(&label.trim())
}
