use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel an OTP was issued over.
///
/// Wire format: `i16` column value (0 = email, 1 = phone). Lookups are always
/// channel-scoped so an email code never validates a phone verification and
/// vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpChannel {
    Email = 0,
    Phone = 1,
}

impl OtpChannel {
    /// Convert from `i16` wire value. Returns `None` for unknown values.
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(Self::Email),
            1 => Some(Self::Phone),
            _ => None,
        }
    }

    /// Convert to `i16` wire value.
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

/// Marketplace role a user signs up with.
///
/// Wire format: `i16` column value; JSON format: SCREAMING_SNAKE_CASE string
/// (`"CUSTOMER"` etc.), matching the legacy application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Customer = 0,
    Vendor = 1,
    ServiceProvider = 2,
    Admin = 3,
}

impl UserRole {
    /// Convert from `u8` wire value. Returns `None` for unknown values.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Customer),
            1 => Some(Self::Vendor),
            2 => Some(Self::ServiceProvider),
            3 => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to `u8` wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One-time passcode bound to an email address or phone number.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    /// Email or phone the code was issued for.
    pub identifier: String,
    pub channel: OtpChannel,
    /// bcrypt hash of the 6-digit code; the plaintext is never persisted.
    pub code_hash: String,
    /// Set when the identifier already belonged to an account at issuance;
    /// absent for phone signup codes.
    pub user_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    /// Set exactly once, when a verification attempt succeeds.
    pub consumed_at: Option<DateTime<Utc>>,
    /// Failed comparison count; the record stops being a candidate at
    /// [`MAX_OTP_ATTEMPTS`].
    pub attempts: i16,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Whether the record is still a verification candidate.
    pub fn is_active(&self) -> bool {
        self.consumed_at.is_none()
            && self.expires_at > Utc::now()
            && self.attempts < MAX_OTP_ATTEMPTS
    }
}

/// Account record owned by the auth service.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// bcrypt password hash; `None` for phone-first signups.
    pub password: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Verification flag for the given channel.
    pub fn is_verified_on(&self, channel: OtpChannel) -> bool {
        match channel {
            OtpChannel::Email => self.email_verified,
            OtpChannel::Phone => self.phone_verified,
        }
    }
}

/// Outcome of a successful phone verification. Tagged so callers cannot
/// forget the implicit-signup case.
#[derive(Debug)]
pub enum PhoneVerifyOutcome {
    /// The identifier already belonged to an account; it is now phone-verified.
    Verified(User),
    /// No account existed; one was created, implicitly phone-verified.
    VerifiedAndCreated(User),
}

impl PhoneVerifyOutcome {
    pub fn user(&self) -> &User {
        match self {
            Self::Verified(user) | Self::VerifiedAndCreated(user) => user,
        }
    }

    pub fn is_new_user(&self) -> bool {
        matches!(self, Self::VerifiedAndCreated(_))
    }
}

/// OTP time-to-live in seconds (10 minutes).
pub const OTP_TTL_SECS: i64 = 600;

/// Inclusive bounds of the 6-digit code space.
pub const OTP_CODE_MIN: u32 = 100_000;
pub const OTP_CODE_MAX: u32 = 999_999;

/// Failed attempts after which a record stops being a candidate and a fresh
/// issuance is required.
pub const MAX_OTP_ATTEMPTS: i16 = 5;

/// bcrypt work factor for OTP codes and passwords.
pub const HASH_COST: u32 = 10;
