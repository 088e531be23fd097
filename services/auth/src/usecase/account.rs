use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::{User, UserRole};
use crate::error::AuthServiceError;
use crate::usecase::otp::{hash_code, verify_code};

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub role: UserRole,
}

pub struct RegisterUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RegisterUseCase<U> {
    /// Create an unverified account. The caller is expected to follow up
    /// with an OTP request for the registered channel.
    pub async fn execute(&self, input: RegisterInput) -> Result<User, AuthServiceError> {
        let existing = match (&input.email, &input.phone) {
            (Some(email), _) => self.users.find_by_email(email).await?,
            (None, Some(phone)) => self.users.find_by_phone(phone).await?,
            (None, None) => return Err(AuthServiceError::MissingField("email or phone")),
        };
        if existing.is_some() {
            return Err(AuthServiceError::UserExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: input.email,
            phone: input.phone,
            password: Some(hash_code(&input.password)?),
            role: input.role,
            email_verified: false,
            phone_verified: false,
            created_at: Utc::now(),
        };
        self.users.create(&user).await?;
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(&self, input: LoginInput) -> Result<User, AuthServiceError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        // Phone-first accounts have no password; same response as a wrong
        // one, no oracle.
        let password_hash = user
            .password
            .as_deref()
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !user.email_verified {
            return Err(AuthServiceError::EmailNotVerified);
        }

        if !verify_code(&input.password, password_hash)? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        Ok(user)
    }
}
