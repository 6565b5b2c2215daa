use crate::capture::station::CaptureStation;
use crate::remote::client::{AttendanceApi, BackendHealth};
use crate::scan::service::ScanService;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    #[schema(example = "ok")]
    status: &'static str,
    backend: BackendHealth,
    #[schema(example = "idle")]
    camera: &'static str,
    scanning: bool,
}

/// Console and backend liveness for the status indicator
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Backend reachable", body = HealthReport),
        (status = 503, description = "Backend unreachable", body = HealthReport)
    ),
    tag = "Health"
)]
pub async fn health(
    api: web::Data<AttendanceApi>,
    station: web::Data<CaptureStation>,
    scans: web::Data<ScanService>,
) -> HttpResponse {
    let backend = api.health().await;
    let report = HealthReport {
        status: if backend.reachable { "ok" } else { "degraded" },
        camera: station.status().await.state,
        scanning: scans.is_scanning(),
        backend,
    };
    if report.backend.reachable {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::ServiceUnavailable().json(report)
    }
}
