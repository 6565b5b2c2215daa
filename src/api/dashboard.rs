use crate::auth::session::Session;
use crate::dashboard::service::{DashboardService, filter_schools, high_dropout};
use crate::error::AppError;
use crate::export::csv;
use crate::model::role::Role;
use crate::model::stats::SchoolSummary;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SchoolSearch {
    /// matched against school name and location
    pub search: Option<String>,
}

pub(crate) fn csv_attachment(bytes: Vec<u8>, filename: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(bytes)
}

/// Stats, recent records and quick actions for the logged-in role
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard for the session's role", body = Dashboard),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Attendance service error, retry"),
        (status = 503, description = "Attendance service unreachable, retry")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(
    session: Session,
    dashboards: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    let dashboard = dashboards.load(&session.user).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": dashboard })))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/student/calendar",
    responses((status = 200, description = "Attendance calendar of the logged-in student", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn student_calendar(
    session: Session,
    dashboards: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    session.require(&[Role::Student])?;
    let data = dashboards.student_calendar(&session.user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/student/analytics",
    responses((status = 200, description = "Attendance analytics of the logged-in student", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn student_analytics(
    session: Session,
    dashboards: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    session.require(&[Role::Student])?;
    let data = dashboards.student_analytics(&session.user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
}

/// Personal attendance report as CSV
#[utoipa::path(
    get,
    path = "/api/dashboard/student/report.csv",
    responses((status = 200, description = "CSV report", content_type = "text/csv")),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn student_report(
    session: Session,
    dashboards: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    session.require(&[Role::Student])?;
    let stats = dashboards.student_stats(&session.user.id).await?;
    let today = Local::now().date_naive();
    let bytes = csv::student_report(&stats, today)?;
    Ok(csv_attachment(bytes, csv::student_report_filename(today)))
}

async fn schools(
    session: &Session,
    dashboards: &DashboardService,
) -> Result<Vec<SchoolSummary>, AppError> {
    session.require(&[Role::Education])?;
    Ok(dashboards.education_stats().await?.schools)
}

#[utoipa::path(
    get,
    path = "/api/dashboard/education/schools",
    params(SchoolSearch),
    responses((status = 200, description = "Schools matching the search", body = [SchoolSummary])),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn search_schools(
    session: Session,
    dashboards: web::Data<DashboardService>,
    query: web::Query<SchoolSearch>,
) -> Result<HttpResponse, AppError> {
    let all = schools(&session, &dashboards).await?;
    let found = filter_schools(&all, query.search.as_deref().unwrap_or_default());
    Ok(HttpResponse::Ok().json(json!({ "success": true, "total": found.len(), "data": found })))
}

/// Schools whose dropout rate is above 3%
#[utoipa::path(
    get,
    path = "/api/dashboard/education/dropout",
    responses((status = 200, description = "Schools above the dropout threshold", body = [SchoolSummary])),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dropout_analysis(
    session: Session,
    dashboards: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    let all = schools(&session, &dashboards).await?;
    let flagged = high_dropout(&all);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Found {} schools with dropout rate above 3%", flagged.len()),
        "data": flagged,
    })))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/education/report.csv",
    responses((status = 200, description = "District report", content_type = "text/csv")),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn district_report(
    session: Session,
    dashboards: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    let all = schools(&session, &dashboards).await?;
    let bytes = csv::district_report(&all)?;
    Ok(csv_attachment(
        bytes,
        csv::district_report_filename(Local::now().date_naive()),
    ))
}
