use sea_orm::Database;
use tracing::info;

use mrkim_auth::config::AuthConfig;
use mrkim_auth::infra::sender::NotificationSender;
use mrkim_auth::router::build_router;
use mrkim_auth::state::AppState;

#[tokio::main]
async fn main() {
    mrkim_auth::telemetry::init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let sender = NotificationSender::from_config(&config).expect("failed to build code sender");

    let state = AppState {
        db,
        sender,
        session_secret: config.session_secret,
        cookie_domain: config.cookie_domain,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
