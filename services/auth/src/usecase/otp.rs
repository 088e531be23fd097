use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use tracing::warn;
use uuid::Uuid;

use crate::domain::repository::{CodeSender, OtpRepository, UserRepository};
use crate::domain::types::{
    HASH_COST, OTP_CODE_MAX, OTP_CODE_MIN, OTP_TTL_SECS, OtpChannel, OtpRecord,
    PhoneVerifyOutcome, User, UserRole,
};
use crate::error::AuthServiceError;

/// Generate a 6-digit code, uniform over [100000, 999999]. `rand::rng()` is
/// a CSPRNG, so codes are not guessable faster than brute force over the
/// space.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(OTP_CODE_MIN..=OTP_CODE_MAX).to_string()
}

/// bcrypt-hash a code (or password) with a per-call random salt.
pub fn hash_code(code: &str) -> Result<String, AuthServiceError> {
    bcrypt::hash(code, HASH_COST).map_err(|e| AuthServiceError::Internal(e.into()))
}

/// Compare a plaintext code against a stored hash. Never reconstructs the
/// plaintext.
pub fn verify_code(code: &str, hash: &str) -> Result<bool, AuthServiceError> {
    bcrypt::verify(code, hash).map_err(|e| AuthServiceError::Internal(e.into()))
}

/// Expiry for a code issued now.
pub fn expiration() -> DateTime<Utc> {
    Utc::now() + Duration::seconds(OTP_TTL_SECS)
}

/// Issue a code: persist the hashed record first, then hand the plaintext to
/// the sender. Delivery failure does not roll the record back.
async fn issue<O, S>(
    otp_codes: &O,
    sender: &S,
    identifier: String,
    channel: OtpChannel,
    user_id: Option<Uuid>,
) -> Result<(), AuthServiceError>
where
    O: OtpRepository,
    S: CodeSender,
{
    let code = generate_code();
    let now = Utc::now();
    let record = OtpRecord {
        id: Uuid::new_v4(),
        identifier: identifier.clone(),
        channel,
        code_hash: hash_code(&code)?,
        user_id,
        expires_at: expiration(),
        consumed_at: None,
        attempts: 0,
        created_at: now,
    };
    otp_codes.create(&record).await?;

    if let Err(e) = sender.send_code(channel, &identifier, &code).await {
        warn!(error = %e, identifier = %identifier, "failed to deliver OTP code");
    }
    Ok(())
}

/// Account lookup by the identifier kind the channel implies.
async fn find_by_identifier<U>(
    users: &U,
    identifier: &str,
    channel: OtpChannel,
) -> Result<Option<User>, AuthServiceError>
where
    U: UserRepository,
{
    match channel {
        OtpChannel::Email => users.find_by_email(identifier).await,
        OtpChannel::Phone => users.find_by_phone(identifier).await,
    }
}

// ── RequestVerification ──────────────────────────────────────────────────────

pub struct RequestVerificationInput {
    pub identifier: String,
    pub channel: OtpChannel,
}

/// Issue a re-verification code for either channel. The account must exist
/// and must not be verified on that channel yet.
pub struct RequestVerificationUseCase<U, O, S>
where
    U: UserRepository,
    O: OtpRepository,
    S: CodeSender,
{
    pub users: U,
    pub otp_codes: O,
    pub sender: S,
}

impl<U, O, S> RequestVerificationUseCase<U, O, S>
where
    U: UserRepository,
    O: OtpRepository,
    S: CodeSender,
{
    pub async fn execute(&self, input: RequestVerificationInput) -> Result<(), AuthServiceError> {
        let user = find_by_identifier(&self.users, &input.identifier, input.channel)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;
        if user.is_verified_on(input.channel) {
            return Err(AuthServiceError::AlreadyVerified);
        }

        issue(
            &self.otp_codes,
            &self.sender,
            input.identifier,
            input.channel,
            Some(user.id),
        )
        .await
    }
}

// ── RequestPhoneOtp ──────────────────────────────────────────────────────────

pub struct RequestPhoneOtpInput {
    pub phone: String,
}

pub struct RequestPhoneOtpUseCase<U, O, S>
where
    U: UserRepository,
    O: OtpRepository,
    S: CodeSender,
{
    pub users: U,
    pub otp_codes: O,
    pub sender: S,
}

impl<U, O, S> RequestPhoneOtpUseCase<U, O, S>
where
    U: UserRepository,
    O: OtpRepository,
    S: CodeSender,
{
    pub async fn execute(&self, input: RequestPhoneOtpInput) -> Result<(), AuthServiceError> {
        // Phone codes double as signup: no account precondition. The record
        // carries the user id only when one already exists.
        let user = self.users.find_by_phone(&input.phone).await?;

        issue(
            &self.otp_codes,
            &self.sender,
            input.phone,
            OtpChannel::Phone,
            user.map(|u| u.id),
        )
        .await
    }
}

// ── VerifyIdentifier ─────────────────────────────────────────────────────────

pub struct VerifyIdentifierInput {
    pub identifier: String,
    pub channel: OtpChannel,
    pub code: String,
}

/// Mark an existing account's email or phone verified against a valid code.
/// No session, no account creation; the phone signup path is
/// [`VerifyPhoneOtpUseCase`].
pub struct VerifyIdentifierUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    pub users: U,
    pub otp_codes: O,
}

impl<U, O> VerifyIdentifierUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    pub async fn execute(&self, input: VerifyIdentifierInput) -> Result<(), AuthServiceError> {
        let record = self
            .otp_codes
            .find_active(&input.identifier, input.channel)
            .await?
            .ok_or(AuthServiceError::InvalidOrExpiredOtp)?;

        if !verify_code(&input.code, &record.code_hash)? {
            self.otp_codes.record_failed_attempt(record.id).await?;
            return Err(AuthServiceError::InvalidCode);
        }

        let user = find_by_identifier(&self.users, &input.identifier, input.channel)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        self.otp_codes
            .consume_verifying_user(record.id, user.id, input.channel)
            .await
    }
}

// ── VerifyPhoneOtp ───────────────────────────────────────────────────────────

pub struct VerifyPhoneOtpInput {
    pub phone: String,
    pub code: String,
    /// Required only when no account exists for the phone yet.
    pub role: Option<UserRole>,
}

pub struct VerifyPhoneOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    pub users: U,
    pub otp_codes: O,
}

impl<U, O> VerifyPhoneOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    /// Session establishment is deliberately not part of this use case; the
    /// handler issues the session cookie from the returned outcome.
    pub async fn execute(
        &self,
        input: VerifyPhoneOtpInput,
    ) -> Result<PhoneVerifyOutcome, AuthServiceError> {
        let record = self
            .otp_codes
            .find_active(&input.phone, OtpChannel::Phone)
            .await?
            .ok_or(AuthServiceError::InvalidOrExpiredOtp)?;

        if !verify_code(&input.code, &record.code_hash)? {
            self.otp_codes.record_failed_attempt(record.id).await?;
            return Err(AuthServiceError::InvalidCode);
        }

        match self.users.find_by_phone(&input.phone).await? {
            Some(mut user) => {
                self.otp_codes
                    .consume_verifying_user(record.id, user.id, OtpChannel::Phone)
                    .await?;
                user.phone_verified = true;
                Ok(PhoneVerifyOutcome::Verified(user))
            }
            None => {
                let role = input.role.ok_or(AuthServiceError::MissingField("role"))?;
                let user = User {
                    id: Uuid::new_v4(),
                    email: None,
                    phone: Some(input.phone),
                    password: None,
                    role,
                    email_verified: false,
                    phone_verified: true,
                    created_at: Utc::now(),
                };
                self.otp_codes
                    .consume_creating_user(record.id, &user)
                    .await?;
                Ok(PhoneVerifyOutcome::VerifiedAndCreated(user))
            }
        }
    }
}
