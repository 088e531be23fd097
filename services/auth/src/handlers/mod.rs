pub mod account;
pub mod health;
pub mod otp;

use serde::Serialize;

use crate::domain::types::{User, UserRole};

/// Plain `{message}` success body.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// User shape exposed over the API — never the password hash.
#[derive(Serialize)]
pub struct UserBody {
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
        }
    }
}
