use crate::capture::sampler::EncodedFrame;
use crate::error::AppError;
use crate::model::face::{DetectedFace, RecognitionResponse};
use crate::model::notification::Notification;
use crate::model::role::Role;
use crate::model::stats::ApiEnvelope;
use crate::model::user::SessionUser;
use crate::model::attendance::{AttendanceSummary, PeriodAttendanceRecord};
use crate::remote::query::PeriodQuery;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// What the backend made of one submitted frame.
#[derive(Debug, Clone)]
pub enum RecognitionOutcome {
    Faces(Vec<DetectedFace>),
    NoFaces { message: Option<String> },
    /// 2xx reply with `success: false`
    Rejected { message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    pub period: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

#[derive(Deserialize)]
struct LoginReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    user: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct MessageReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackendHealth {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// CSV bytes from the backend export.
pub struct CsvExport {
    pub bytes: Vec<u8>,
}

/// HTTP client for the attendance backend. One base URL for every call.
#[derive(Clone)]
pub struct AttendanceApi {
    http: Client,
    base: Url,
}

impl AttendanceApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base = Url::parse(base_url)
            .map_err(|e| AppError::Internal(format!("invalid API_BASE_URL {base_url:?}: {e}")))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self { http, base })
    }

    pub fn url(&self, path: &str) -> Result<Url, AppError> {
        self.base
            .join(path)
            .map_err(|e| AppError::Internal(format!("bad backend path {path:?}: {e}")))
    }

    pub fn export_url(&self, query: &PeriodQuery) -> Result<Url, AppError> {
        let mut url = self.url("/api/period-attendance/export")?;
        query.apply(&mut url);
        Ok(url)
    }

    /// Turns a non-2xx reply into an error, preferring the backend's own
    /// `message`.
    async fn failure(resp: Response, fallback: &str) -> AppError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| fallback.to_string());
        warn!(status = status.as_u16(), %message, "attendance service call failed");
        AppError::Upstream {
            status: status.as_u16(),
            message,
        }
    }

    async fn checked(resp: Response, fallback: &str) -> Result<Response, AppError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(Self::failure(resp, fallback).await)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, fallback: &str) -> Result<T, AppError> {
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;
        Ok(Self::checked(resp, fallback).await?.json::<T>().await?)
    }

    /// Reads an `{ success, data }` envelope; `success: false` is a rejection,
    /// a missing `data` is "nothing found".
    async fn get_data<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, AppError> {
        let envelope: ApiEnvelope<T> = self
            .get_json(url, &format!("Failed to fetch {what}"))
            .await?;
        debug!(what, total = ?envelope.total, "envelope received");
        if !envelope.success {
            return Err(AppError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| format!("Failed to fetch {what}")),
            ));
        }
        envelope
            .data
            .ok_or_else(|| AppError::NoData(format!("No {what} found")))
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<Vec<T>, AppError> {
        match self.get_data(url, what).await {
            Err(AppError::NoData(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    #[instrument(name = "remote_login", skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<SessionUser, AppError> {
        let resp = self
            .http
            .post(self.url("/api/login")?)
            .json(&json!({ "username": username, "password": password, "role": role }))
            .send()
            .await?;

        // 401 still carries the usual JSON reply
        if !resp.status().is_success() && resp.status() != StatusCode::UNAUTHORIZED {
            return Err(Self::failure(resp, "Login service error").await);
        }

        let reply: LoginReply = resp.json().await?;
        if !reply.success {
            return Err(AppError::Unauthorized(
                reply
                    .message
                    .unwrap_or_else(|| "Access Denied: Invalid Credentials".into()),
            ));
        }

        let user = reply.user.unwrap_or(Value::Null);
        // the backend's view of the account wins over the role picked on the form
        if let Some(actual) = user.get("role").and_then(Value::as_str) {
            if actual.trim().to_lowercase().parse::<Role>().ok() != Some(role) {
                warn!(%username, requested = %role, actual, "login role mismatch");
                return Err(AppError::Forbidden(format!(
                    "This account cannot sign in as {role}"
                )));
            }
        }
        let id = user
            .get("id")
            .or_else(|| user.get("username"))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| username.to_string());
        let full_name = ["fullName", "full_name", "name"]
            .iter()
            .find_map(|k| user.get(*k).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        Ok(SessionUser {
            id,
            full_name,
            role,
        })
    }

    #[instrument(name = "remote_recognize", skip(self, frame, ctx), fields(bytes = frame.bytes.len(), period = ?ctx.period))]
    pub async fn recognize(
        &self,
        frame: &EncodedFrame,
        ctx: &ScanContext,
    ) -> Result<RecognitionOutcome, AppError> {
        let body = RecognizeRequest {
            image: frame.to_base64(),
            period: ctx.period.as_deref().map(str::trim).filter(|p| !p.is_empty()),
            date: ctx.date.map(|d| d.format("%Y-%m-%d").to_string()),
        };

        let resp = self
            .http
            .post(self.url("/api/recognize")?)
            .json(&body)
            .send()
            .await?;
        let resp =
            Self::checked(resp, "Failed to communicate with the recognition service").await?;
        let reply: RecognitionResponse = resp.json().await?;

        Ok(if !reply.success {
            RecognitionOutcome::Rejected {
                message: reply
                    .message
                    .unwrap_or_else(|| "No students detected".into()),
            }
        } else if reply.detected_faces.is_empty() {
            RecognitionOutcome::NoFaces {
                message: reply.message,
            }
        } else {
            RecognitionOutcome::Faces(reply.detected_faces)
        })
    }

    #[instrument(name = "remote_enroll", skip(self, frames), fields(frames = frames.len()))]
    pub async fn enroll_face(
        &self,
        student_name: &str,
        student_id: &str,
        frames: &[EncodedFrame],
    ) -> Result<String, AppError> {
        let mut form = Form::new()
            .text("studentName", student_name.to_string())
            .text("studentId", student_id.to_string());
        for (i, frame) in frames.iter().enumerate() {
            let part = Part::bytes(frame.bytes.clone())
                .file_name(format!("image_{i}.jpg"))
                .mime_str("image/jpeg")?;
            form = form.part("images", part);
        }

        let resp = self
            .http
            .post(self.url("/api/enroll-face")?)
            .multipart(form)
            .send()
            .await?;

        if resp.status() == StatusCode::BAD_REQUEST {
            let reply: MessageReply = resp.json().await?;
            return Err(AppError::Rejected(
                reply.message.unwrap_or_else(|| "Failed to enroll student".into()),
            ));
        }
        let reply: MessageReply = Self::checked(resp, "Failed to enroll student")
            .await?
            .json()
            .await?;
        if !reply.success {
            return Err(AppError::Rejected(
                reply.message.unwrap_or_else(|| "Failed to enroll student".into()),
            ));
        }
        Ok(reply
            .message
            .unwrap_or_else(|| "Student enrolled successfully!".into()))
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, AppError> {
        self.get_list(self.url("/api/notifications")?, "notifications")
            .await
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<(), AppError> {
        let resp = self
            .http
            .put(self.url("/api/notifications")?)
            .json(&json!({ "id": id }))
            .send()
            .await?;
        Self::checked(resp, "Failed to mark notification as read").await?;
        Ok(())
    }

    pub async fn period_attendance(
        &self,
        query: &PeriodQuery,
    ) -> Result<Vec<PeriodAttendanceRecord>, AppError> {
        let mut url = self.url("/api/period-attendance")?;
        query.apply(&mut url);
        self.get_list(url, "period attendance").await
    }

    pub async fn period_attendance_summary(
        &self,
        date: Option<&str>,
    ) -> Result<Vec<AttendanceSummary>, AppError> {
        let query = PeriodQuery {
            date: date.map(str::to_string),
            period: None,
        };
        let mut url = self.url("/api/period-attendance/summary")?;
        query.apply(&mut url);
        self.get_list(url, "attendance summary").await
    }

    pub async fn export_period_attendance(&self, query: &PeriodQuery) -> Result<CsvExport, AppError> {
        let url = self.export_url(query)?;
        debug!(%url, "exporting period attendance");
        let resp = self.http.get(url).send().await?;
        let resp = Self::checked(resp, "Failed to export attendance").await?;
        let bytes = resp.bytes().await?.to_vec();
        Ok(CsvExport { bytes })
    }

    /// `GET /api/{role}/stats`
    pub async fn role_stats<T: DeserializeOwned>(&self, role: Role) -> Result<T, AppError> {
        let url = self.url(&format!("/api/{}/stats", role.as_ref()))?;
        self.get_data(url, &format!("{role} statistics")).await
    }

    /// `GET /api/student/{id}/{attendance|calendar|analytics}`
    pub async fn student_data<T: DeserializeOwned>(
        &self,
        student_id: &str,
        section: &str,
    ) -> Result<T, AppError> {
        let mut url = self.url("/api/student/")?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .push(student_id)
            .push(section);
        self.get_data(url, &format!("student {section}")).await
    }

    pub async fn students(&self, class: Option<&str>, section: Option<&str>) -> Result<Value, AppError> {
        let mut url = self.url("/api/students")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(c) = class.filter(|c| !c.is_empty()) {
                pairs.append_pair("class", c);
            }
            if let Some(s) = section.filter(|s| !s.is_empty()) {
                pairs.append_pair("section", s);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get_json(url, "Failed to fetch students").await
    }

    pub async fn search_students(&self, q: &str) -> Result<Value, AppError> {
        let mut url = self.url("/api/students/search")?;
        url.query_pairs_mut().append_pair("q", q);
        self.get_json(url, "Failed to search students").await
    }

    pub async fn mark_attendance(
        &self,
        student_ids: &[String],
        period: &str,
        date: &str,
    ) -> Result<String, AppError> {
        let resp = self
            .http
            .post(self.url("/api/attendance")?)
            .json(&json!({ "studentIds": student_ids, "period": period, "date": date }))
            .send()
            .await?;
        let reply: MessageReply = Self::checked(resp, "Failed to mark attendance")
            .await?
            .json()
            .await?;
        if !reply.success {
            return Err(AppError::Rejected(
                reply.message.unwrap_or_else(|| "Failed to mark attendance".into()),
            ));
        }
        Ok(reply.message.unwrap_or_default())
    }

    /// Liveness probe for the status indicator. Never fails; an unreachable
    /// backend is reported in the result.
    pub async fn health(&self) -> BackendHealth {
        let started = Instant::now();
        let result = match self.url("/health") {
            Ok(url) => self.http.get(url).send().await.map_err(AppError::from),
            Err(e) => Err(e),
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(resp) => BackendHealth {
                reachable: resp.status().is_success(),
                status: Some(resp.status().as_u16()),
                latency_ms,
                error: None,
            },
            Err(e) => BackendHealth {
                reachable: false,
                status: None,
                latency_ms,
                error: Some(e.to_string()),
            },
        }
    }
}
