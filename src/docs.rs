use crate::api::attendance::BulkAttendance;
use crate::api::camera::StartCamera;
use crate::api::health::HealthReport;
use crate::auth::handlers::LoginResponse;
use crate::capture::media::FacingMode;
use crate::capture::station::CameraStatus;
use crate::dashboard::{Dashboard, QuickAction};
use crate::model::attendance::{AttendanceSummary, PeriodAttendanceRecord};
use crate::model::face::DetectedFace;
use crate::model::notification::{Notification, NotificationType};
use crate::model::role::Role;
use crate::model::stats::{
    AdminStats, EducationStats, SchoolSummary, StudentAttendanceDay, StudentStats, TeacherStats,
};
use crate::model::user::SessionUser;
use crate::models::LoginReqDto;
use crate::notify::poller::NotificationSnapshot;
use crate::remote::client::BackendHealth;
use crate::scan::enrollment::{DraftStatus, EnrollmentRequest};
use crate::scan::presenter::{CategoryGroup, Dialog, FaceCategory, PresentedFace, ScanReport, Toast};
use crate::scan::service::ScanRequest;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Praesentix Console API",
        version = "0.1.0",
        description = r#"
## Praesentix attendance console

Back end of the classroom kiosk. It owns the camera, sends snapshots to the
attendance service for face recognition and turns the answers into toasts and
dialogs for the operator.

### Features
- **Camera**: start, stop and switch the kiosk camera
- **Scan**: capture a frame and mark attendance for a class period
- **Enrollment**: collect face images of a new student
- **Dashboards**: role-specific stats for students, teachers, admins and the education department
- **Attendance**: period records, summaries, CSV export and bulk marking
- **Notifications**: polled from the attendance service

### Security
Log in at `/auth/login`. The session travels in the `currentUser` cookie; a
`Bearer` header with the same token also works.

### Errors
Every error body is `{ success: false, error, message, level, retryable }`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::auth::handlers::current_session,

        crate::api::health::health,

        crate::api::camera::camera_status,
        crate::api::camera::start_camera,
        crate::api::camera::stop_camera,
        crate::api::camera::switch_camera,

        crate::api::scan::scan,

        crate::api::enrollment::draft,
        crate::api::enrollment::capture_frame,
        crate::api::enrollment::reset,
        crate::api::enrollment::submit,

        crate::api::dashboard::dashboard,
        crate::api::dashboard::student_calendar,
        crate::api::dashboard::student_analytics,
        crate::api::dashboard::student_report,
        crate::api::dashboard::search_schools,
        crate::api::dashboard::dropout_analysis,
        crate::api::dashboard::district_report,

        crate::api::notifications::list,
        crate::api::notifications::mark_read,

        crate::api::attendance::period_records,
        crate::api::attendance::period_summary,
        crate::api::attendance::period_export,
        crate::api::attendance::bulk_mark,
        crate::api::attendance::periods,

        crate::api::students::list_students,
        crate::api::students::search_students
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            SessionUser,
            Role,
            HealthReport,
            BackendHealth,
            FacingMode,
            StartCamera,
            CameraStatus,
            ScanRequest,
            ScanReport,
            PresentedFace,
            DetectedFace,
            FaceCategory,
            CategoryGroup,
            Toast,
            Dialog,
            EnrollmentRequest,
            DraftStatus,
            Dashboard,
            QuickAction,
            StudentStats,
            StudentAttendanceDay,
            TeacherStats,
            AdminStats,
            EducationStats,
            SchoolSummary,
            Notification,
            NotificationType,
            NotificationSnapshot,
            PeriodAttendanceRecord,
            AttendanceSummary,
            BulkAttendance
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, logout and session"),
        (name = "Health", description = "Console and backend status"),
        (name = "Camera", description = "Kiosk camera control"),
        (name = "Scan", description = "Face-recognition attendance"),
        (name = "Enrollment", description = "Face enrollment of new students"),
        (name = "Dashboard", description = "Role-specific dashboards and reports"),
        (name = "Notifications", description = "Notification center"),
        (name = "Attendance", description = "Period attendance records and exports"),
        (name = "Students", description = "Student directory"),
    )
)]
pub struct ApiDoc;

/// Prefix the protected routes are documented under.
const DOCUMENTED_PREFIX: &str = "/api";

/// The OpenAPI document with protected paths moved under `prefix`.
pub fn api_doc(prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let prefix = prefix.trim_end_matches('/');
    if prefix != DOCUMENTED_PREFIX {
        let paths = std::mem::take(&mut doc.paths.paths);
        doc.paths.paths = paths
            .into_iter()
            .map(|(path, item)| match path.strip_prefix(DOCUMENTED_PREFIX) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                    (format!("{prefix}{rest}"), item)
                }
                _ => (path, item),
            })
            .collect();
    }
    doc
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/auth/login", "/api/scan", "/api/attendance/period/export", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn protected_paths_follow_the_configured_prefix() {
        let doc = api_doc("/kiosk/");
        assert!(doc.paths.paths.contains_key("/kiosk/scan"));
        assert!(!doc.paths.paths.contains_key("/api/scan"));
        assert!(doc.paths.paths.contains_key("/auth/login"));
        assert!(doc.paths.paths.contains_key("/health"));

        assert!(api_doc("/api").paths.paths.contains_key("/api/scan"));
    }
}
