use crate::model::role::Role;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuickAction {
    #[schema(example = "camera-attendance")]
    pub id: &'static str,
    pub label: &'static str,
    #[schema(example = "/api/scan")]
    pub href: String,
}

/// Role-specific shell of the dashboard: title and quick actions.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    pub role: Role,
    pub title: &'static str,
    pub quick_actions: Vec<QuickAction>,
}

impl DashboardLayout {
    /// `prefix` is where the protected routes are mounted (`API_PREFIX`).
    pub fn for_role(role: Role, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let action = |id: &'static str, label: &'static str, route: &str| QuickAction {
            id,
            label,
            href: format!("{prefix}{route}"),
        };
        let (title, quick_actions) = match role {
            Role::Student => (
                "Student Dashboard",
                vec![action(
                    "download-report",
                    "Download Report",
                    "/dashboard/student/report.csv",
                )],
            ),
            Role::Teacher => (
                "Teacher Dashboard",
                vec![
                    action("camera-attendance", "Camera Attendance", "/scan"),
                    action("period-attendance", "Period Attendance", "/attendance/period"),
                    action("export", "Export Attendance", "/attendance/period/export"),
                ],
            ),
            Role::Admin => (
                "Admin Dashboard",
                vec![
                    action("face-enrollment", "Face Enrollment", "/enrollment"),
                    action("user-management", "User Management", "/students"),
                    action("bulk-operations", "Bulk Operations", "/attendance/bulk"),
                    action("export", "Export Attendance", "/attendance/period/export"),
                ],
            ),
            Role::Education => (
                "Education Department Dashboard",
                vec![
                    action(
                        "district-report",
                        "District Report",
                        "/dashboard/education/report.csv",
                    ),
                    action(
                        "dropout-analysis",
                        "Dropout Analysis",
                        "/dashboard/education/dropout",
                    ),
                    action(
                        "custom-reports",
                        "Custom Reports",
                        "/dashboard/education/schools",
                    ),
                ],
            ),
        };
        Self {
            role,
            title,
            quick_actions,
        }
    }
}
