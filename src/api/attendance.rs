use crate::api::dashboard::csv_attachment;
use crate::auth::session::Session;
use crate::dashboard::DashboardService;
use crate::error::AppError;
use crate::export::csv::period_export_filename;
use crate::model::attendance::{PERIODS, is_known_period};
use crate::remote::client::AttendanceApi;
use crate::remote::query::PeriodQuery;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAttendance {
    #[schema(example = json!(["S001", "S004"]))]
    pub student_ids: Vec<String>,
    #[schema(example = "1st Period (9:00-10:00)")]
    pub period: String,
    #[schema(example = "2024-01-10", value_type = String, format = "date")]
    pub date: NaiveDate,
}

/// Period attendance records, optionally filtered by date and period
#[utoipa::path(
    get,
    path = "/api/attendance/period",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Matching records, possibly none", body = [PeriodAttendanceRecord]),
        (status = 503, description = "Attendance service unreachable")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn period_records(
    session: Session,
    api: web::Data<AttendanceApi>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    let records = api.period_attendance(&query).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "total": records.len(),
        "data": records,
    })))
}

/// Present, live and spoofed counts per period
#[utoipa::path(
    get,
    path = "/api/attendance/period/summary",
    params(PeriodQuery),
    responses((status = 200, description = "Per-period counts", body = [AttendanceSummary])),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn period_summary(
    session: Session,
    api: web::Data<AttendanceApi>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    let summary = api.period_attendance_summary(query.date()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": summary })))
}

/// CSV export of one day, one period or all of them
#[utoipa::path(
    get,
    path = "/api/attendance/period/export",
    params(PeriodQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv"),
        (status = 400, description = "No date selected"),
        (status = 404, description = "No data received from server")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn period_export(
    session: Session,
    api: web::Data<AttendanceApi>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    let date = query
        .date()
        .ok_or_else(|| AppError::BadRequest("Please select a date for download".into()))?;

    let export = api.export_period_attendance(&query).await?;
    if export.bytes.is_empty() {
        return Err(AppError::NoData("No data received from server".into()));
    }
    info!(date, period = ?query.period(), bytes = export.bytes.len(), "period attendance exported");

    Ok(csv_attachment(
        export.bytes,
        period_export_filename(date, query.period()),
    ))
}

/// Marks several students present for one period
#[utoipa::path(
    post,
    path = "/api/attendance/bulk",
    request_body = BulkAttendance,
    responses(
        (status = 200, description = "Attendance recorded", body = Object, example = json!({
            "success": true, "message": "Attendance marked for 2 students"
        })),
        (status = 400, description = "No students or unknown period"),
        (status = 422, description = "Backend refused the request")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn bulk_mark(
    session: Session,
    api: web::Data<AttendanceApi>,
    dashboards: web::Data<DashboardService>,
    body: web::Json<BulkAttendance>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    if body.student_ids.is_empty() {
        return Err(AppError::BadRequest("Select at least one student".into()));
    }
    if !is_known_period(&body.period) {
        return Err(AppError::BadRequest(format!("Unknown period {:?}", body.period)));
    }

    let date = body.date.format("%Y-%m-%d").to_string();
    let message = api
        .mark_attendance(&body.student_ids, body.period.trim(), &date)
        .await?;
    info!(students = body.student_ids.len(), period = %body.period, "bulk attendance marked");
    dashboards.invalidate(&session.user).await;

    let message = if message.is_empty() {
        format!("Attendance marked for {} students", body.student_ids.len())
    } else {
        message
    };
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": message })))
}

/// The class periods attendance is recorded against
#[utoipa::path(
    get,
    path = "/api/periods",
    responses((status = 200, description = "Period labels in day order", body = [String])),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn periods(_session: Session) -> HttpResponse {
    HttpResponse::Ok().json(PERIODS)
}
