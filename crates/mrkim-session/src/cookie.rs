//! Session cookie builder.
//!
//! One cookie, `mrkim_session`, holding the signed session JWT. Attributes
//! match the legacy application: HttpOnly, Secure, SameSite=Lax, 7-day
//! Max-Age.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the session token.
pub const MRKIM_SESSION: &str = "mrkim_session";

/// Session lifetime in seconds (7 days) — both the cookie Max-Age and the
/// JWT `exp` claim.
pub const SESSION_EXP: u64 = 604800;

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use mrkim_session::cookie::{set_session_cookie, MRKIM_SESSION};
///
/// let jar = CookieJar::new();
/// let jar = set_session_cookie(jar, "token_value".to_string(), "mrkim.co.ke".to_string());
/// let cookie = jar.get(MRKIM_SESSION).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("mrkim.co.ke"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    let cookie = Cookie::build((MRKIM_SESSION, value))
        .path("/")
        .domain(domain)
        .max_age(Duration::seconds(SESSION_EXP as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Clear the session cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use mrkim_session::cookie::{clear_session_cookie, set_session_cookie, MRKIM_SESSION};
///
/// let jar = CookieJar::new();
/// let jar = set_session_cookie(jar, "a".to_string(), "mrkim.co.ke".to_string());
/// let jar = clear_session_cookie(jar, "mrkim.co.ke".to_string());
/// let cookie = jar.get(MRKIM_SESSION).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookie(jar: CookieJar, domain: String) -> CookieJar {
    let cookie = Cookie::build((MRKIM_SESSION, ""))
        .path("/")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
