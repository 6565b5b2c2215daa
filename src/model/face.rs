use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const UNKNOWN_NAME: &str = "Unknown";

/// One face region of a recognition call. Lives only for the current scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Sreyan Panda",
    "rollNumber": "S004",
    "spoofed": false,
    "emotion": "Neutral",
    "recognitionConfidence": 91.4,
    "livenessConfidence": 88.0,
    "isLive": true,
    "attendanceMarked": true,
    "attendanceAlreadyMarked": false
}))]
pub struct DetectedFace {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "studentId")]
    pub roll_number: String,
    #[serde(default)]
    pub spoofed: bool,
    #[serde(default)]
    pub emotion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognition_confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(default)]
    pub attendance_marked: bool,
    #[serde(default)]
    pub attendance_already_marked: bool,
}

impl DetectedFace {
    pub fn is_unknown(&self) -> bool {
        let name = self.name.trim();
        let roll = self.roll_number.trim();
        name.is_empty() || name.eq_ignore_ascii_case(UNKNOWN_NAME) || roll.is_empty() || roll == "N/A"
    }

    /// Any liveness-failure signal counts.
    pub fn is_spoofed(&self) -> bool {
        self.spoofed || self.is_live == Some(false)
    }

    pub fn label(&self) -> String {
        if self.roll_number.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.roll_number)
        }
    }
}

/// Body of `POST /api/recognize`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResponse {
    pub success: bool,
    #[serde(default)]
    pub detected_faces: Vec<DetectedFace>,
    #[serde(default)]
    pub message: Option<String>,
}
