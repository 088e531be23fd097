#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{OtpChannel, OtpRecord, User};
use crate::error::AuthServiceError;

/// Repository for account records.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AuthServiceError>;
    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;
}

/// Repository for one-time passcodes.
///
/// The two `consume_*` operations pair the consume step with its user-side
/// effect in a single database transaction, so a crash can never leave a
/// consumed code next to an unverified user.
pub trait OtpRepository: Send + Sync {
    /// Insert a freshly issued record. Prior records for the same identifier
    /// are left untouched; they simply stop being selected once superseded
    /// or expired.
    async fn create(&self, record: &OtpRecord) -> Result<(), AuthServiceError>;

    /// Most-recently-created active record for the identifier + channel, or
    /// `None`. Active: unconsumed, unexpired, under the attempt limit.
    async fn find_active(
        &self,
        identifier: &str,
        channel: OtpChannel,
    ) -> Result<Option<OtpRecord>, AuthServiceError>;

    /// Record a failed comparison against a live record.
    async fn record_failed_attempt(&self, id: Uuid) -> Result<(), AuthServiceError>;

    /// Consume the record and mark the user's channel verified, atomically.
    async fn consume_verifying_user(
        &self,
        record_id: Uuid,
        user_id: Uuid,
        channel: OtpChannel,
    ) -> Result<(), AuthServiceError>;

    /// Consume the record and create the given (phone-verified) account,
    /// atomically.
    async fn consume_creating_user(
        &self,
        record_id: Uuid,
        user: &User,
    ) -> Result<(), AuthServiceError>;
}

/// Port for delivering a plaintext code to its identifier.
///
/// Best-effort: issuance treats delivery failure as non-fatal — the stored
/// record stands either way and the error is only logged.
pub trait CodeSender: Send + Sync {
    async fn send_code(
        &self,
        channel: OtpChannel,
        identifier: &str,
        code: &str,
    ) -> Result<(), AuthServiceError>;
}
