use axum::{extract::State, http::StatusCode};
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::state::AppState;

/// `GET /healthz` — liveness. The process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz` — readiness. The service cannot do anything useful without
/// its database, so readiness is a ping against it.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(&state.db).await
}

async fn readiness(db: &DatabaseConnection) -> StatusCode {
    match db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
