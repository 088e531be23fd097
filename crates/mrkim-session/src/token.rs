//! Session JWT validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identity extracted from a validated session token.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub user_id: Uuid,
    /// Email or phone number the session was established with.
    pub identifier: String,
    pub role: u8,
    pub session_exp: u64,
}

/// Errors returned by [`validate_session_token`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("session expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload shared by session creation (auth service) and
/// validation (any consumer).
///
/// | Field | JWT claim | Rust type | Meaning |
/// |-------|-----------|-----------|---------|
/// | `sub` | `sub` | UUID string | user ID |
/// | `idf` | custom | string | email or phone the session binds to |
/// | `role` | custom | `u8` wire value | see `UserRole` in the auth service |
/// | `exp` | `exp` | seconds since epoch | session expiration |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID (UUID string).
    pub sub: String,
    /// Identifier (email or phone) the session was established with.
    pub idf: String,
    /// User role as `u8` wire value.
    pub role: u8,
    /// Expiration timestamp (seconds since UNIX epoch).
    pub exp: u64,
}

/// Validate a session cookie value, returning parsed identity.
///
/// Validation: HS256, exp checked, required claims: `exp` + `sub`.
/// Default leeway = 60s — tolerates clock skew between services.
pub fn validate_session_token(
    cookie_value: &str,
    secret: &str,
) -> Result<SessionInfo, SessionError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        cookie_value,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => SessionError::InvalidSignature,
        _ => SessionError::Malformed,
    })?;

    let user_id = data
        .claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| SessionError::Malformed)?;

    Ok(SessionInfo {
        user_id,
        identifier: data.claims.idf,
        role: data.claims.role,
        session_exp: data.claims.exp,
    })
}
