use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[schema(format = "date-time", value_type = String)]
    pub timestamp: String,
    #[serde(default, deserialize_with = "flag")]
    pub read: bool,
}

// sqlite hands the flag back as 0/1
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
        serde_json::Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!("unexpected read flag {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_flag_accepts_integers() {
        let n: Notification = serde_json::from_str(
            r#"{"id":3,"type":"warning","title":"Low attendance","message":"7B below 75%","timestamp":"2024-01-10T09:00:00","read":0}"#,
        )
        .unwrap();
        assert_eq!(n.kind, NotificationType::Warning);
        assert!(!n.read);
    }
}
