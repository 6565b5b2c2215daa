use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// `{ success, data, message, total }` wrapper used by most backend reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentAttendanceDay {
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub date: String,
    #[schema(example = "present")]
    pub status: String,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentStats {
    pub attendance_percentage: f64,
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub rank: Option<u32>,
    pub attendance_records: Vec<StudentAttendanceDay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherStats {
    pub total_classes: u32,
    pub students_total: u32,
    pub average_attendance: f64,
    pub today_present: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_students: u32,
    pub total_teachers: u32,
    pub average_attendance: f64,
    pub active_users: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolSummary {
    #[serde(deserialize_with = "loose_string")]
    pub id: String,
    pub name: String,
    pub location: String,
    pub total_students: u32,
    pub current_students: Option<u32>,
    pub total_teachers: u32,
    pub attendance_rate: Option<f64>,
    pub dropout_rate: Option<f64>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationStats {
    pub total_schools: u32,
    pub total_students: u32,
    pub total_teachers: u32,
    pub average_attendance: f64,
    pub average_dropout_rate: f64,
    pub schools: Vec<SchoolSummary>,
}

impl EducationStats {
    /// Fills the district totals from the school list when the backend left
    /// them out.
    pub fn with_rollup(mut self) -> Self {
        if self.total_schools > 0 || self.schools.is_empty() {
            return self;
        }
        let n = self.schools.len() as f64;
        self.total_schools = self.schools.len() as u32;
        self.total_students = self.schools.iter().map(|s| s.total_students).sum();
        self.total_teachers = self.schools.iter().map(|s| s.total_teachers).sum();
        self.average_attendance =
            self.schools.iter().map(|s| s.attendance_rate.unwrap_or(0.0)).sum::<f64>() / n;
        self.average_dropout_rate =
            self.schools.iter().map(|s| s.dropout_rate.unwrap_or(0.0)).sum::<f64>() / n;
        self
    }
}

/// Stats block of a dashboard, one shape per role.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DashboardStats {
    Student(StudentStats),
    Teacher(TeacherStats),
    Admin(AdminStats),
    Education(EducationStats),
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(students: u32, teachers: u32, attendance: f64, dropout: f64) -> SchoolSummary {
        SchoolSummary {
            total_students: students,
            total_teachers: teachers,
            attendance_rate: Some(attendance),
            dropout_rate: Some(dropout),
            ..Default::default()
        }
    }

    #[test]
    fn rollup_averages_school_rates() {
        let stats = EducationStats {
            schools: vec![school(400, 20, 90.0, 2.0), school(600, 30, 80.0, 4.0)],
            ..Default::default()
        }
        .with_rollup();

        assert_eq!(stats.total_schools, 2);
        assert_eq!(stats.total_students, 1000);
        assert_eq!(stats.total_teachers, 50);
        assert!((stats.average_attendance - 85.0).abs() < f64::EPSILON);
        assert!((stats.average_dropout_rate - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rollup_keeps_backend_totals() {
        let stats = EducationStats {
            total_schools: 12,
            schools: vec![school(1, 1, 1.0, 1.0)],
            ..Default::default()
        }
        .with_rollup();
        assert_eq!(stats.total_schools, 12);
        assert_eq!(stats.total_students, 0);
    }

    #[test]
    fn envelope_tolerates_missing_data() {
        let env: ApiEnvelope<TeacherStats> =
            serde_json::from_str(r#"{"success":false,"message":"no stats"}"#).unwrap();
        assert!(!env.success);
        assert!(env.data.is_none());
    }

    #[test]
    fn envelope_payload_needs_no_default() {
        #[derive(Debug, Deserialize)]
        struct Period {
            label: String,
        }

        let env: ApiEnvelope<Vec<Period>> =
            serde_json::from_str(r#"{"success":true,"total":0}"#).unwrap();
        assert!(env.data.is_none());
        assert_eq!(env.total, Some(0));

        let env: ApiEnvelope<Period> =
            serde_json::from_str(r#"{"success":true,"data":{"label":"1st Period"}}"#).unwrap();
        assert_eq!(env.data.unwrap().label, "1st Period");
    }

    #[test]
    fn school_ids_may_be_numbers() {
        let s: SchoolSummary = serde_json::from_str(r#"{"id": 42, "name": "GHS Puri"}"#).unwrap();
        assert_eq!(s.id, "42");
    }
}
