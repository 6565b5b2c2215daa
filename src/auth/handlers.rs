use crate::{
    auth::{
        jwt::{issue_session_token, verify_token},
        session::{SESSION_COOKIE, Session, session_token},
    },
    config::Config,
    error::AppError,
    model::user::SessionUser,
    models::LoginReqDto,
    remote::client::AttendanceApi,
    utils::session_revocation,
};
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    success: bool,
    user: SessionUser,
    token: String,
    #[schema(example = "/dashboard/teacher")]
    redirect: String,
}

fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(CookieDuration::seconds(config.session_ttl as i64))
        .finish()
}

/// Checks the credentials against the attendance backend and opens a session.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Attendance service unavailable")
    )
)]
#[instrument(
    name = "auth_login",
    skip(api, config, user),
    fields(username = %user.username, role = %user.role)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    api: web::Data<AttendanceApi>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(AppError::BadRequest(
            "Username and password are required".into(),
        ));
    }

    let session_user = api
        .login(user.username.trim(), &user.password, user.role)
        .await?;
    debug!(user_id = %session_user.id, "Credentials accepted");

    let (token, claims) =
        issue_session_token(&session_user, &config.session_secret, config.session_ttl)?;
    debug!(jti = %claims.jti, "Session issued");

    info!("Login successful");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token.clone(), &config))
        .json(LoginResponse {
            success: true,
            redirect: session_user.role.dashboard_route(),
            user: session_user,
            token,
        }))
}

/// Ends the session and sends the browser back to the landing page.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 303, description = "Session cleared, redirect to /"))
)]
pub async fn logout(req: HttpRequest, config: web::Data<Config>) -> impl Responder {
    if let Some(claims) =
        session_token(&req).and_then(|t| verify_token(&t, &config.session_secret).ok())
    {
        session_revocation::revoke(&claims.jti, claims.exp as u64).await;
        info!(user_id = %claims.sub, "Logged out");
    }

    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();

    HttpResponse::SeeOther()
        .insert_header((LOCATION, "/"))
        .cookie(removal)
        .finish()
}

/// The logged-in user.
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session", body = SessionUser),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn current_session(session: Session) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "user": session.user,
        "redirect": session.user.role.dashboard_route(),
        "expiresAt": session.exp,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::middleware::session_middleware;
    use crate::model::role::Role;
    use actix_web::middleware::from_fn;
    use actix_web::{App, http::StatusCode, test};

    fn config() -> Config {
        Config::for_tests("http://127.0.0.1:9")
    }

    fn teacher() -> SessionUser {
        SessionUser {
            id: "t1".into(),
            full_name: "Asha Rao".into(),
            role: Role::Teacher,
        }
    }

    #[actix_web::test]
    async fn logout_redirects_home_and_expires_the_cookie() {
        let cfg = config();
        let (token, _) = issue_session_token(&teacher(), &cfg.session_secret, 86_400).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cfg))
                .route("/auth/logout", web::post().to(logout))
                .service(
                    web::scope("/api")
                        .wrap(from_fn(session_middleware))
                        .route("/session", web::get().to(current_session)),
                ),
        )
        .await;

        let cookie = Cookie::new(SESSION_COOKIE, token);
        let req = test::TestRequest::get()
            .uri("/api/session")
            .cookie(cookie.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");
        let cleared = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .unwrap();
        assert_eq!(cleared.value(), "");

        // the old token no longer opens a session
        let req = test::TestRequest::get()
            .uri("/api/session")
            .cookie(cookie)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn logout_without_session_still_redirects() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config()))
                .route("/auth/logout", web::post().to(logout)),
        )
        .await;
        let resp =
            test::call_service(&app, test::TestRequest::post().uri("/auth/logout").to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    #[actix_web::test]
    async fn empty_credentials_are_rejected_before_the_backend() {
        let cfg = config();
        let api = AttendanceApi::new(&cfg.api_base_url, cfg.request_timeout).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cfg))
                .app_data(web::Data::new(api))
                .route("/auth/login", web::post().to(login)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": " ", "password": "", "role": "teacher" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
