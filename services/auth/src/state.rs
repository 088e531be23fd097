use sea_orm::DatabaseConnection;

use crate::infra::db::{DbOtpRepository, DbUserRepository};
use crate::infra::sender::NotificationSender;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sender: NotificationSender,
    pub session_secret: String,
    pub cookie_domain: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }

    pub fn code_sender(&self) -> NotificationSender {
        self.sender.clone()
    }
}
