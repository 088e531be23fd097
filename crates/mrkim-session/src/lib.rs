//! Session types shared across Mr. Kim services.
//!
//! The auth service issues the session token; any service sitting behind the
//! same cookie domain can validate it with [`token::validate_session_token`].

pub mod cookie;
pub mod token;
