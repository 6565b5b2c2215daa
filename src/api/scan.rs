use crate::auth::session::Session;
use crate::error::AppError;
use crate::scan::service::{ScanRequest, ScanService};
use actix_web::{HttpResponse, web};

/// Captures the current frame and asks the backend who is in it.
#[utoipa::path(
    post,
    path = "/api/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Faces classified into toasts and an optional dialog", body = ScanReport),
        (status = 400, description = "No class period selected"),
        (status = 409, description = "Camera inactive, frame not ready, or a scan already running"),
        (status = 502, description = "Recognition service error"),
        (status = 503, description = "Recognition service unreachable"),
        (status = 504, description = "Recognition timed out")
    ),
    security(("bearer_auth" = [])),
    tag = "Scan"
)]
pub async fn scan(
    session: Session,
    scans: web::Data<ScanService>,
    body: web::Json<ScanRequest>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    let report = scans.scan(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}
