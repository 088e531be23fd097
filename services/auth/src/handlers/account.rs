use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use mrkim_session::cookie::{MRKIM_SESSION, clear_session_cookie, set_session_cookie};
use mrkim_session::token::validate_session_token;

use crate::domain::repository::UserRepository;
use crate::domain::types::UserRole;
use crate::error::AuthServiceError;
use crate::handlers::UserBody;
use crate::state::AppState;
use crate::usecase::account::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};
use crate::usecase::session::issue_session_token;

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserBody,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or(AuthServiceError::MissingField("password"))?;
    let role = body.role.ok_or(AuthServiceError::MissingField("role"))?;

    let usecase = RegisterUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(RegisterInput {
            email: body.email.filter(|e| !e.is_empty()),
            phone: body.phone.filter(|p| !p.is_empty()),
            password,
            role,
        })
        .await?;

    let channel = if user.email.is_some() { "email" } else { "phone" };
    let response = RegisterResponse {
        message: format!("User created successfully. Please verify your {channel}."),
        user: UserBody::from(&user),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: UserBody,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let email = body
        .email
        .filter(|e| !e.is_empty())
        .ok_or(AuthServiceError::MissingField("email"))?;
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or(AuthServiceError::MissingField("password"))?;

    let usecase = LoginUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(LoginInput { email: email.clone(), password }).await?;

    let (token, _) = issue_session_token(&user, &email, &state.session_secret)?;
    let jar = set_session_cookie(jar, token, state.cookie_domain.clone());

    let response = LoginResponse {
        message: "Login successful",
        user: UserBody::from(&user),
    };
    Ok((StatusCode::OK, jar, Json(response)))
}

// ── GET /auth/session ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<UserBody>,
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
}

impl SessionResponse {
    fn anonymous() -> Self {
        Self {
            user: None,
            is_logged_in: false,
        }
    }
}

/// Always 200; an absent, invalid, or stale session yields
/// `{user: null, isLoggedIn: false}` rather than an error.
pub async fn get_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, AuthServiceError> {
    let Some(cookie) = jar.get(MRKIM_SESSION) else {
        return Ok(Json(SessionResponse::anonymous()));
    };
    let Ok(info) = validate_session_token(cookie.value(), &state.session_secret) else {
        return Ok(Json(SessionResponse::anonymous()));
    };

    let user = state.user_repo().find_by_id(info.user_id).await?;
    Ok(Json(match user {
        Some(user) => SessionResponse {
            user: Some(UserBody::from(&user)),
            is_logged_in: true,
        },
        None => SessionResponse::anonymous(),
    }))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    let jar = clear_session_cookie(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}
