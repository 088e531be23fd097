use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    account::{get_session, login, logout, register},
    health::{healthz, readyz},
    otp::{
        request_email_otp, request_phone_otp, request_phone_verification, verify_email_otp,
        verify_phone_otp, verify_phone_verification,
    },
};
use crate::state::AppState;
use crate::telemetry::request_id_layer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // OTP — email re-verification
        .route("/auth/email/request", post(request_email_otp))
        .route("/auth/email/verify", post(verify_email_otp))
        // OTP — phone re-verification
        .route("/auth/phone/request", post(request_phone_verification))
        .route("/auth/phone/verify", post(verify_phone_verification))
        // OTP — phone login / signup
        .route("/auth/otp/request", post(request_phone_otp))
        .route("/auth/otp/verify", post(verify_phone_otp))
        // Accounts
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/session", get(get_session))
        .route("/auth/logout", post(logout))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
