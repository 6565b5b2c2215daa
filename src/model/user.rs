use crate::model::role::Role;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Identity returned by the backend on login and kept in the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(deserialize_with = "id_as_string")]
    #[schema(example = "S001")]
    pub id: String,
    #[serde(alias = "name", alias = "full_name", default)]
    #[schema(example = "Saanjh Nayak")]
    pub full_name: String,
    pub role: Role,
}

impl SessionUser {
    /// Name shown in dashboard headers; falls back to the role when the
    /// backend did not send one.
    pub fn display_name(&self) -> String {
        if self.full_name.trim().is_empty() {
            let role = self.role.to_string();
            let mut chars = role.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => role,
            }
        } else {
            self.full_name.clone()
        }
    }
}

// the backend sends numeric ids for staff and string roll numbers for students
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected user id {other}"
        ))),
    }
}
