use crate::auth::session::Session;
use crate::error::AppError;
use crate::notify::poller::NotificationCenter;
use actix_web::{HttpResponse, web};

/// Latest polled notifications with the unread count
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses((status = 200, description = "Cached notification list", body = NotificationSnapshot)),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn list(
    _session: Session,
    center: web::Data<NotificationCenter>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(center.snapshot().await))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked as read", body = NotificationSnapshot),
        (status = 502, description = "Attendance service error")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_read(
    _session: Session,
    center: web::Data<NotificationCenter>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(center.mark_read(path.into_inner()).await?))
}
