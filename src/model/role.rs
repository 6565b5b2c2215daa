use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Who is logged in at the console. Lowercase on the wire and in routes
/// (`/dashboard/teacher`, `/api/teacher/stats`).
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
    Education,
}

impl Role {
    /// Roles allowed to drive the camera and read period attendance
    pub fn can_take_attendance(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }

    pub fn dashboard_route(&self) -> String {
        format!("/dashboard/{}", self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_lowercase_names() {
        assert_eq!(Role::from_str("education").unwrap(), Role::Education);
        assert!(Role::from_str("hr").is_err());
    }

    #[test]
    fn every_role_has_a_dashboard_route() {
        let routes: Vec<_> = Role::iter().map(|r| r.dashboard_route()).collect();
        assert_eq!(
            routes,
            [
                "/dashboard/student",
                "/dashboard/teacher",
                "/dashboard/admin",
                "/dashboard/education"
            ]
        );
    }
}
