/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing the session JWT.
    pub session_secret: String,
    /// Cookie domain attribute (root domain, e.g. "mrkim.co.ke").
    pub cookie_domain: String,
    /// TCP port to listen on (default 3100). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// SMTP relay host for email codes.
    pub smtp_host: String,
    /// SMTP port (default 587, STARTTLS).
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    /// From address on code emails (default "noreply@mrkim.com").
    pub smtp_from: String,
    /// Twilio credentials for SMS codes.
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    /// Sender id (alphanumeric sender or phone number).
    pub twilio_sender_id: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            session_secret: std::env::var("SESSION_SECRET").expect("SESSION_SECRET"),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3100),
            smtp_host: std::env::var("SMTP_HOST").expect("SMTP_HOST"),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            smtp_user: std::env::var("SMTP_USER").expect("SMTP_USER"),
            smtp_pass: std::env::var("SMTP_PASS").expect("SMTP_PASS"),
            smtp_from: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| "noreply@mrkim.com".to_owned()),
            twilio_account_sid: std::env::var("TWILIO_ACCOUNT_SID").expect("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: std::env::var("TWILIO_AUTH_TOKEN").expect("TWILIO_AUTH_TOKEN"),
            twilio_sender_id: std::env::var("TWILIO_SENDER_ID").expect("TWILIO_SENDER_ID"),
        }
    }
}
