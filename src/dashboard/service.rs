use crate::dashboard::layout::{DashboardLayout, QuickAction};
use crate::error::AppError;
use crate::model::attendance::PeriodAttendanceRecord;
use crate::model::role::Role;
use crate::model::stats::{
    AdminStats, DashboardStats, EducationStats, SchoolSummary, StudentStats, TeacherStats,
};
use crate::model::user::SessionUser;
use crate::remote::client::AttendanceApi;
use crate::remote::query::PeriodQuery;
use chrono::Local;
use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// Schools above this dropout rate (percent) are flagged.
pub const DROPOUT_ALERT_RATE: f64 = 3.0;
const RECENT_RECORDS: usize = 10;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user: SessionUser,
    pub display_name: String,
    pub role: Role,
    pub title: &'static str,
    #[schema(value_type = Object)]
    pub stats: DashboardStats,
    /// Teacher only: first records of today's period attendance.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recent: Vec<PeriodAttendanceRecord>,
    pub quick_actions: Vec<QuickAction>,
}

pub struct DashboardService {
    api: AttendanceApi,
    stats: Cache<(Role, String), DashboardStats>,
    api_prefix: String,
}

impl DashboardService {
    pub fn new(api: AttendanceApi, ttl: Duration, api_prefix: &str) -> Self {
        Self {
            api,
            api_prefix: api_prefix.to_string(),
            stats: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    async fn fetch_stats(&self, user: &SessionUser) -> Result<DashboardStats, AppError> {
        Ok(match user.role {
            Role::Student => DashboardStats::Student(self.student_stats(&user.id).await?),
            Role::Teacher => {
                DashboardStats::Teacher(self.api.role_stats::<TeacherStats>(Role::Teacher).await?)
            }
            Role::Admin => {
                DashboardStats::Admin(self.api.role_stats::<AdminStats>(Role::Admin).await?)
            }
            Role::Education => DashboardStats::Education(self.education_stats().await?),
        })
    }

    /// Cached per (role, user). Failures are never cached.
    pub async fn stats(&self, user: &SessionUser) -> Result<DashboardStats, AppError> {
        let key = (user.role, user.id.clone());
        if let Some(hit) = self.stats.get(&key).await {
            debug!(role = %user.role, "dashboard stats from cache");
            return Ok(hit);
        }
        let fresh = self.fetch_stats(user).await?;
        self.stats.insert(key, fresh.clone()).await;
        Ok(fresh)
    }

    #[instrument(name = "dashboard_load", skip(self, user), fields(role = %user.role))]
    pub async fn load(&self, user: &SessionUser) -> Result<Dashboard, AppError> {
        let stats = self.stats(user).await?;
        let recent = if user.role == Role::Teacher {
            let today = PeriodQuery::new(Some(Local::now().date_naive()), None);
            let mut records = self.api.period_attendance(&today).await?;
            records.truncate(RECENT_RECORDS);
            records
        } else {
            Vec::new()
        };
        let layout = DashboardLayout::for_role(user.role, &self.api_prefix);

        Ok(Dashboard {
            user: user.clone(),
            display_name: user.display_name(),
            role: user.role,
            title: layout.title,
            stats,
            recent,
            quick_actions: layout.quick_actions,
        })
    }

    pub async fn student_stats(&self, student_id: &str) -> Result<StudentStats, AppError> {
        self.api.student_data(student_id, "attendance").await
    }

    pub async fn student_calendar(&self, student_id: &str) -> Result<Value, AppError> {
        self.api.student_data(student_id, "calendar").await
    }

    pub async fn student_analytics(&self, student_id: &str) -> Result<Value, AppError> {
        self.api.student_data(student_id, "analytics").await
    }

    pub async fn education_stats(&self) -> Result<EducationStats, AppError> {
        Ok(self
            .api
            .role_stats::<EducationStats>(Role::Education)
            .await?
            .with_rollup())
    }

    pub async fn invalidate(&self, user: &SessionUser) {
        self.stats.invalidate(&(user.role, user.id.clone())).await;
    }
}

/// Schools whose name or location contains `search`, ignoring case. A blank
/// search keeps every school.
pub fn filter_schools<'a>(schools: &'a [SchoolSummary], search: &str) -> Vec<&'a SchoolSummary> {
    let needle = search.trim().to_lowercase();
    schools
        .iter()
        .filter(|s| {
            needle.is_empty()
                || s.name.to_lowercase().contains(&needle)
                || s.location.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn high_dropout(schools: &[SchoolSummary]) -> Vec<&SchoolSummary> {
    schools
        .iter()
        .filter(|s| s.dropout_rate.unwrap_or(0.0) > DROPOUT_ALERT_RATE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::stub::StubBackend;
    use actix_web::{HttpResponse, web};
    use serde_json::json;

    fn school(name: &str, location: &str, dropout: f64) -> SchoolSummary {
        SchoolSummary {
            name: name.into(),
            location: location.into(),
            dropout_rate: Some(dropout),
            ..Default::default()
        }
    }

    #[test]
    fn search_matches_name_or_location() {
        let schools = vec![
            school("Govt High School", "Puri", 2.0),
            school("Model School", "Cuttack", 4.5),
        ];
        assert_eq!(filter_schools(&schools, "puri").len(), 1);
        assert_eq!(filter_schools(&schools, "SCHOOL").len(), 2);
        assert_eq!(filter_schools(&schools, "  ").len(), 2);
        assert_eq!(high_dropout(&schools)[0].name, "Model School");
    }

    fn teacher() -> SessionUser {
        SessionUser {
            id: "t1".into(),
            full_name: "Asha Rao".into(),
            role: Role::Teacher,
        }
    }

    #[actix_web::test]
    async fn teacher_stats_are_cached_and_failures_surface() {
        let stub = StubBackend::start(|cfg| {
            cfg.route(
                "/api/teacher/stats",
                web::get().to(|| async {
                    HttpResponse::Ok().json(json!({
                        "success": true,
                        "data": { "totalClasses": 6, "studentsTotal": 40, "averageAttendance": 91.5 }
                    }))
                }),
            )
            .route(
                "/api/period-attendance",
                web::get().to(|| async {
                    HttpResponse::ServiceUnavailable().json(json!({ "message": "db offline" }))
                }),
            );
        })
        .await;
        let api = AttendanceApi::new(&stub.base_url, Duration::from_secs(5)).unwrap();
        let svc = DashboardService::new(api, Duration::from_secs(60), "/api");

        let first = svc.stats(&teacher()).await.unwrap();
        let second = svc.stats(&teacher()).await.unwrap();
        assert!(matches!(first, DashboardStats::Teacher(ref s) if s.total_classes == 6));
        assert!(matches!(second, DashboardStats::Teacher(_)));
        assert_eq!(stub.hits_to("/api/teacher/stats"), 1);

        // recent records come from a failing endpoint; no placeholder is produced
        let err = svc.load(&teacher()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { status: 503, .. }));
        stub.stop().await;
    }
}
