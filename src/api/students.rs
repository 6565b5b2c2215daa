use crate::auth::session::Session;
use crate::error::AppError;
use crate::remote::client::AttendanceApi;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StudentFilter {
    #[param(example = "8")]
    pub class: Option<String>,
    #[param(example = "B")]
    pub section: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StudentSearch {
    /// name or roll number fragment
    pub q: String,
}

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilter),
    responses((status = 200, description = "Backend student list, passed through", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn list_students(
    session: Session,
    api: web::Data<AttendanceApi>,
    query: web::Query<StudentFilter>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    let students = api
        .students(query.class.as_deref(), query.section.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/search",
    params(StudentSearch),
    responses(
        (status = 200, description = "Backend search result, passed through", body = Object),
        (status = 400, description = "Empty search")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn search_students(
    session: Session,
    api: web::Data<AttendanceApi>,
    query: web::Query<StudentSearch>,
) -> Result<HttpResponse, AppError> {
    session.require_staff()?;
    let q = query.q.trim();
    if q.is_empty() {
        return Err(AppError::BadRequest("Search text is required".into()));
    }
    Ok(HttpResponse::Ok().json(api.search_students(q).await?))
}
