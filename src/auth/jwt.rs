use std::time::{SystemTime, UNIX_EPOCH};

use crate::{error::AppError, model::user::SessionUser, models::SessionClaims};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

pub fn issue_session_token(
    user: &SessionUser,
    secret: &str,
    ttl: usize,
) -> Result<(String, SessionClaims), AppError> {
    let claims = SessionClaims {
        sub: user.id.clone(),
        name: user.full_name.clone(),
        role: user.role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("could not sign session: {e}")))?;

    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<SessionClaims, String> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn user() -> SessionUser {
        SessionUser {
            id: "42".into(),
            full_name: "Asha Rao".into(),
            role: Role::Teacher,
        }
    }

    #[test]
    fn token_round_trips_with_the_right_secret_only() {
        let (token, issued) = issue_session_token(&user(), "s3cret", 60).unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, Role::Teacher);
        assert_eq!(claims.jti, issued.jti);

        assert!(verify_token(&token, "other").is_err());
    }
}
