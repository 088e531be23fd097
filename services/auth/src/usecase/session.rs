use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};

use mrkim_session::cookie::SESSION_EXP;
use mrkim_session::token::SessionClaims;

use crate::domain::types::User;
use crate::error::AuthServiceError;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Issue the session JWT for a user, bound to the identifier (email or
/// phone) the session was established with.
pub fn issue_session_token(
    user: &User,
    identifier: &str,
    secret: &str,
) -> Result<(String, u64), AuthServiceError> {
    let exp = now_secs() + SESSION_EXP;
    let claims = SessionClaims {
        sub: user.id.to_string(),
        idf: identifier.to_owned(),
        role: user.role.as_u8(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))?;
    Ok((token, exp))
}
