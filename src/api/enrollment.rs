use crate::auth::session::Session;
use crate::error::AppError;
use crate::model::role::Role;
use crate::scan::enrollment::{EnrollmentRequest, EnrollmentService};
use actix_web::{HttpResponse, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/enrollment",
    responses((status = 200, description = "Frames collected so far", body = DraftStatus)),
    security(("bearer_auth" = [])),
    tag = "Enrollment"
)]
pub async fn draft(
    session: Session,
    enrollment: web::Data<EnrollmentService>,
) -> Result<HttpResponse, AppError> {
    session.require(&[Role::Admin])?;
    Ok(HttpResponse::Ok().json(enrollment.draft().await))
}

/// Adds the current camera frame to the enrollment draft
#[utoipa::path(
    post,
    path = "/api/enrollment/frames",
    responses(
        (status = 200, description = "Frame captured", body = DraftStatus),
        (status = 409, description = "Camera inactive or frame not ready")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollment"
)]
pub async fn capture_frame(
    session: Session,
    enrollment: web::Data<EnrollmentService>,
) -> Result<HttpResponse, AppError> {
    session.require(&[Role::Admin])?;
    Ok(HttpResponse::Ok().json(enrollment.capture().await?))
}

#[utoipa::path(
    delete,
    path = "/api/enrollment",
    responses((status = 200, description = "Draft cleared", body = DraftStatus)),
    security(("bearer_auth" = [])),
    tag = "Enrollment"
)]
pub async fn reset(
    session: Session,
    enrollment: web::Data<EnrollmentService>,
) -> Result<HttpResponse, AppError> {
    session.require(&[Role::Admin])?;
    Ok(HttpResponse::Ok().json(enrollment.reset().await))
}

/// Sends the captured frames to the backend for enrollment
#[utoipa::path(
    post,
    path = "/api/enrollment",
    request_body = EnrollmentRequest,
    responses(
        (status = 200, description = "Student enrolled", body = Object, example = json!({
            "success": true, "message": "Student enrolled successfully!"
        })),
        (status = 400, description = "Missing fields or fewer than 3 frames"),
        (status = 422, description = "Backend refused the images")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollment"
)]
pub async fn submit(
    session: Session,
    enrollment: web::Data<EnrollmentService>,
    body: web::Json<EnrollmentRequest>,
) -> Result<HttpResponse, AppError> {
    session.require(&[Role::Admin])?;
    let message = enrollment.submit(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": message })))
}
