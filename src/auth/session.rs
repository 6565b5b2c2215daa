use crate::{error::AppError, model::role::Role, model::user::SessionUser, models::SessionClaims};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

pub const SESSION_COOKIE: &str = "currentUser";

/// The logged-in operator, put in the request extensions by
/// [`session_middleware`](crate::auth::middleware::session_middleware).
#[derive(Debug, Clone)]
pub struct Session {
    pub user: SessionUser,
    pub jti: String,
    pub exp: usize,
}

impl From<SessionClaims> for Session {
    fn from(c: SessionClaims) -> Self {
        Self {
            user: SessionUser {
                id: c.sub,
                full_name: c.name,
                role: c.role,
            },
            jti: c.jti,
            exp: c.exp,
        }
    }
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Session>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("Please log in".into())),
        )
    }
}

impl Session {
    pub fn require(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.user.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Not available to the {} role",
                self.user.role
            )))
        }
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.user.role.can_take_attendance() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only teachers and admins can take attendance".into(),
            ))
        }
    }
}

/// Session token from the `currentUser` cookie, else from a Bearer header.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(c) = req.cookie(SESSION_COOKIE) {
        if !c.value().is_empty() {
            return Some(c.value().to_string());
        }
    }
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}
