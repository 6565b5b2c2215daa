use crate::auth::jwt::verify_token;
use crate::auth::session::{Session, session_token};
use crate::config::Config;
use crate::utils::session_revocation;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;
use tracing::debug;

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(json!({
        "success": false,
        "error": "unauthorized",
        "message": message,
        "level": "error",
        "retryable": false,
    }));
    req.into_response(resp.map_into_boxed_body())
}

/// Resolves the `currentUser` cookie (or a Bearer token) into a [`Session`].
pub async fn session_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let token = match session_token(req.request()) {
        Some(t) => t,
        None => return Ok(unauthorized(req, "Please log in")),
    };

    let claims = match verify_token(&token, &config.session_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "session token rejected");
            return Ok(unauthorized(req, "Session expired, please log in again"));
        }
    };

    if session_revocation::is_revoked(&claims.jti).await {
        return Ok(unauthorized(req, "Session ended, please log in again"));
    }

    req.extensions_mut().insert(Session::from(claims));

    next.call(req).await
}
