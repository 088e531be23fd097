use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};
use std::collections::HashMap;

use crate::config::AuthConfig;
use crate::domain::repository::CodeSender;
use crate::domain::types::OtpChannel;
use crate::error::AuthServiceError;

const TWILIO_MESSAGES_URL: &str = "https://api.twilio.com/2010-04-01/Accounts";

struct SenderConfig {
    smtp_from: String,
    twilio_account_sid: String,
    twilio_auth_token: String,
    twilio_sender_id: String,
}

/// Delivers plaintext codes over SMTP (email channel) or the Twilio
/// Messages API (phone channel).
#[derive(Clone)]
pub struct NotificationSender {
    smtp: AsyncSmtpTransport<Tokio1Executor>,
    http: reqwest::Client,
    config: Arc<SenderConfig>,
}

impl NotificationSender {
    pub fn from_config(config: &AuthConfig) -> Result<Self, anyhow::Error> {
        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());
        let smtp = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .context("build SMTP transport")?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self {
            smtp,
            http: reqwest::Client::new(),
            config: Arc::new(SenderConfig {
                smtp_from: config.smtp_from.clone(),
                twilio_account_sid: config.twilio_account_sid.clone(),
                twilio_auth_token: config.twilio_auth_token.clone(),
                twilio_sender_id: config.twilio_sender_id.clone(),
            }),
        })
    }

    async fn send_email(&self, to: &str, code: &str) -> Result<(), anyhow::Error> {
        let message = Message::builder()
            .from(self.config.smtp_from.parse().context("parse from address")?)
            .to(to.parse().context("parse recipient address")?)
            .subject("Your Verification Code - Mr. Kim")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your verification code is: {code}. It will expire in 10 minutes.\n\n\
                 If you didn't request this code, please ignore this email."
            ))
            .context("build email")?;

        self.smtp.send(message).await.context("send email")?;
        Ok(())
    }

    async fn send_sms(&self, to: &str, code: &str) -> Result<(), anyhow::Error> {
        let url = format!(
            "{TWILIO_MESSAGES_URL}/{}/Messages.json",
            self.config.twilio_account_sid
        );

        let mut form: HashMap<&str, String> = HashMap::new();
        form.insert("To", to.to_owned());
        form.insert("From", self.config.twilio_sender_id.clone());
        form.insert(
            "Body",
            format!("Your verification code is: {code}. It will expire in 10 minutes."),
        );

        let response = self
            .http
            .post(url)
            .basic_auth(
                &self.config.twilio_account_sid,
                Some(&self.config.twilio_auth_token),
            )
            .form(&form)
            .send()
            .await
            .context("send sms request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("twilio returned {status}: {body}"));
        }
        Ok(())
    }
}

impl CodeSender for NotificationSender {
    async fn send_code(
        &self,
        channel: OtpChannel,
        identifier: &str,
        code: &str,
    ) -> Result<(), AuthServiceError> {
        match channel {
            OtpChannel::Email => self.send_email(identifier, code).await?,
            OtpChannel::Phone => self.send_sms(identifier, code).await?,
        }
        Ok(())
    }
}
