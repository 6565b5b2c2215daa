use crate::capture::media::MediaError;
use crate::model::notification::NotificationType;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Every failure the console surfaces to the operator.
///
/// The body of each error response carries the level and a retry hint so the
/// view can render a non-blocking toast instead of a blank screen.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "Camera error: {}", _0)]
    Camera(MediaError),
    #[display(fmt = "Attendance service unavailable: {}", _0)]
    Unavailable(String),
    #[display(fmt = "Attendance service did not answer in time")]
    Timeout,
    #[display(fmt = "Attendance service returned {}: {}", status, message)]
    Upstream { status: u16, message: String },
    #[display(fmt = "{}", _0)]
    Rejected(String),
    #[display(fmt = "{}", _0)]
    NoData(String),
    #[display(fmt = "Could not encode frame: {}", _0)]
    Encoding(String),
    #[display(fmt = "Camera has no frame yet, retry once the stream has settled")]
    FrameNotReady,
    #[display(fmt = "A scan is already in progress")]
    ScanInProgress,
    #[display(fmt = "Camera is not active")]
    CameraInactive,
    #[display(fmt = "Request cancelled")]
    Cancelled,
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Camera(_) => "camera",
            AppError::Unavailable(_) => "service_unavailable",
            AppError::Timeout => "timeout",
            AppError::Upstream { .. } => "upstream",
            AppError::Rejected(_) => "rejected",
            AppError::NoData(_) => "no_data",
            AppError::Encoding(_) => "encoding",
            AppError::FrameNotReady => "frame_not_ready",
            AppError::ScanInProgress => "scan_in_progress",
            AppError::CameraInactive => "camera_inactive",
            AppError::Cancelled => "cancelled",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn level(&self) -> NotificationType {
        match self {
            AppError::ScanInProgress | AppError::Cancelled | AppError::NoData(_) => {
                NotificationType::Info
            }
            AppError::Rejected(_)
            | AppError::FrameNotReady
            | AppError::CameraInactive
            | AppError::Forbidden(_)
            | AppError::BadRequest(_) => NotificationType::Warning,
            _ => NotificationType::Error,
        }
    }

    pub fn retryable(&self) -> bool {
        matches!(
            self,
            AppError::Camera(_)
                | AppError::Unavailable(_)
                | AppError::Timeout
                | AppError::Upstream { .. }
                | AppError::Encoding(_)
                | AppError::FrameNotReady
                | AppError::Cancelled
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Camera(_) | AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NoData(_) => StatusCode::NOT_FOUND,
            AppError::FrameNotReady
            | AppError::ScanInProgress
            | AppError::CameraInactive
            | AppError::Cancelled => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Encoding(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
            "level": self.level(),
            "retryable": self.retryable(),
        }))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Timeout
        } else if e.is_decode() {
            AppError::Upstream {
                status: e.status().map(|s| s.as_u16()).unwrap_or(502),
                message: "Unreadable response from attendance service".into(),
            }
        } else if let Some(status) = e.status() {
            AppError::Upstream {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            AppError::Unavailable(e.to_string())
        }
    }
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        AppError::Camera(e)
    }
}
