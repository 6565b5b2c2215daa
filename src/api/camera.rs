use crate::auth::session::Session;
use crate::capture::media::FacingMode;
use crate::capture::station::CaptureStation;
use crate::error::AppError;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartCamera {
    pub facing_mode: Option<FacingMode>,
}

/// Camera state for the status indicator
#[utoipa::path(
    get,
    path = "/api/camera",
    responses(
        (status = 200, description = "Current camera state", body = CameraStatus),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Camera"
)]
pub async fn camera_status(
    session: Session,
    station: web::Data<CaptureStation>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    Ok(HttpResponse::Ok().json(station.status().await))
}

#[utoipa::path(
    post,
    path = "/api/camera/start",
    request_body(content = StartCamera, description = "Optional facing mode, defaults to the last one used"),
    responses(
        (status = 200, description = "Camera active", body = CameraStatus, example = json!({
            "state": "active", "facingMode": "user", "tracks": 1
        })),
        (status = 503, description = "Permission denied or no camera")
    ),
    security(("bearer_auth" = [])),
    tag = "Camera"
)]
pub async fn start_camera(
    session: Session,
    station: web::Data<CaptureStation>,
    body: Option<web::Json<StartCamera>>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    let facing = body.and_then(|b| b.into_inner().facing_mode);
    let status = station.start(facing).await?;
    info!(user_id = %session.user.id, "camera started");
    Ok(HttpResponse::Ok().json(status))
}

#[utoipa::path(
    post,
    path = "/api/camera/stop",
    responses((status = 200, description = "Camera released", body = CameraStatus)),
    security(("bearer_auth" = [])),
    tag = "Camera"
)]
pub async fn stop_camera(
    session: Session,
    station: web::Data<CaptureStation>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    Ok(HttpResponse::Ok().json(station.stop().await))
}

/// Flips between front and rear camera
#[utoipa::path(
    post,
    path = "/api/camera/switch",
    responses(
        (status = 200, description = "Camera restarted with the other facing mode", body = CameraStatus),
        (status = 503, description = "The other camera could not be opened")
    ),
    security(("bearer_auth" = [])),
    tag = "Camera"
)]
pub async fn switch_camera(
    session: Session,
    station: web::Data<CaptureStation>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    Ok(HttpResponse::Ok().json(station.switch().await?))
}
