use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use mrkim_session::cookie::set_session_cookie;

use crate::domain::types::OtpChannel;
use crate::error::AuthServiceError;
use crate::handlers::{MessageResponse, UserBody};
use crate::state::AppState;
use crate::usecase::otp::{
    RequestPhoneOtpInput, RequestPhoneOtpUseCase, RequestVerificationInput,
    RequestVerificationUseCase, VerifyIdentifierInput, VerifyIdentifierUseCase,
    VerifyPhoneOtpInput, VerifyPhoneOtpUseCase,
};
use crate::usecase::session::issue_session_token;

fn require(field: Option<String>, name: &'static str) -> Result<String, AuthServiceError> {
    field
        .filter(|v| !v.is_empty())
        .ok_or(AuthServiceError::MissingField(name))
}

// ── POST /auth/email/request ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestEmailOtpRequest {
    pub email: Option<String>,
}

pub async fn request_email_otp(
    State(state): State<AppState>,
    Json(body): Json<RequestEmailOtpRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let email = require(body.email, "email")?;
    let usecase = RequestVerificationUseCase {
        users: state.user_repo(),
        otp_codes: state.otp_repo(),
        sender: state.code_sender(),
    };
    usecase
        .execute(RequestVerificationInput {
            identifier: email,
            channel: OtpChannel::Email,
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "OTP sent to your email",
    }))
}

// ── POST /auth/email/verify ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailOtpRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

pub async fn verify_email_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailOtpRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let email = require(body.email, "email")?;
    let code = require(body.code, "code")?;
    let usecase = VerifyIdentifierUseCase {
        users: state.user_repo(),
        otp_codes: state.otp_repo(),
    };
    usecase
        .execute(VerifyIdentifierInput {
            identifier: email,
            channel: OtpChannel::Email,
            code,
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "Email verified successfully",
    }))
}

// ── POST /auth/phone/request ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestPhoneVerificationRequest {
    pub phone: Option<String>,
}

/// Re-verification for an existing account's phone number. Unlike
/// `/auth/otp/request`, an account is a precondition here.
pub async fn request_phone_verification(
    State(state): State<AppState>,
    Json(body): Json<RequestPhoneVerificationRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let phone = require(body.phone, "phone")?;
    let usecase = RequestVerificationUseCase {
        users: state.user_repo(),
        otp_codes: state.otp_repo(),
        sender: state.code_sender(),
    };
    usecase
        .execute(RequestVerificationInput {
            identifier: phone,
            channel: OtpChannel::Phone,
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "OTP sent to your phone",
    }))
}

// ── POST /auth/phone/verify ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyPhoneVerificationRequest {
    pub phone: Option<String>,
    pub code: Option<String>,
}

/// Marks the phone verified on an existing account. No signup, no session —
/// `/auth/otp/verify` is the login path.
pub async fn verify_phone_verification(
    State(state): State<AppState>,
    Json(body): Json<VerifyPhoneVerificationRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let phone = require(body.phone, "phone")?;
    let code = require(body.code, "code")?;
    let usecase = VerifyIdentifierUseCase {
        users: state.user_repo(),
        otp_codes: state.otp_repo(),
    };
    usecase
        .execute(VerifyIdentifierInput {
            identifier: phone,
            channel: OtpChannel::Phone,
            code,
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "Phone verified successfully",
    }))
}

// ── POST /auth/otp/request ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestPhoneOtpRequest {
    pub phone: Option<String>,
}

pub async fn request_phone_otp(
    State(state): State<AppState>,
    Json(body): Json<RequestPhoneOtpRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let phone = require(body.phone, "phone")?;
    let usecase = RequestPhoneOtpUseCase {
        users: state.user_repo(),
        otp_codes: state.otp_repo(),
        sender: state.code_sender(),
    };
    usecase.execute(RequestPhoneOtpInput { phone }).await?;
    Ok(Json(MessageResponse {
        message: "OTP sent to your phone",
    }))
}

// ── POST /auth/otp/verify ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyPhoneOtpRequest {
    pub phone: Option<String>,
    pub code: Option<String>,
    pub role: Option<crate::domain::types::UserRole>,
}

#[derive(Serialize)]
pub struct VerifyPhoneOtpResponse {
    pub message: &'static str,
    #[serde(rename = "isNewUser")]
    pub is_new_user: bool,
    pub user: UserBody,
}

pub async fn verify_phone_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyPhoneOtpRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let phone = require(body.phone, "phone")?;
    let code = require(body.code, "code")?;

    let usecase = VerifyPhoneOtpUseCase {
        users: state.user_repo(),
        otp_codes: state.otp_repo(),
    };
    let outcome = usecase
        .execute(VerifyPhoneOtpInput {
            phone: phone.clone(),
            code,
            role: body.role,
        })
        .await?;

    // Session establishment is the handler's job, not the use case's.
    let (token, _) = issue_session_token(outcome.user(), &phone, &state.session_secret)?;
    let jar = set_session_cookie(jar, token, state.cookie_domain.clone());

    let (status, message) = if outcome.is_new_user() {
        (
            StatusCode::CREATED,
            "Account created and phone verified successfully",
        )
    } else {
        (StatusCode::OK, "Phone verified successfully")
    };

    let response = VerifyPhoneOtpResponse {
        message,
        is_new_user: outcome.is_new_user(),
        user: UserBody::from(outcome.user()),
    };
    Ok((status, jar, Json(response)))
}
