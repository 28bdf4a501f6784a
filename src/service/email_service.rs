use std::time::Duration;

use async_trait::async_trait;
use color_eyre::Result;
use eyre::{WrapErr, eyre};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::config::config::Config;

const OTP_TEMPLATE: &str = include_str!("../../templates/otp_email.html");

/// Outbound delivery of OTP codes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str, valid_for_minutes: i64) -> Result<()>;
}

pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    platform_name: String,
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        // 465 is implicit TLS, everything else upgrades with STARTTLS.
        let builder = if config.smtp_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        }
        .wrap_err("Configuring SMTP relay")?;

        let mailer = builder
            .port(config.smtp_port)
            .credentials(creds)
            .timeout(Some(Duration::from_secs(config.smtp_timeout_secs)))
            .build();

        Ok(Self {
            mailer,
            from_address: config.smtp_from().to_string(),
            platform_name: config.platform_name.clone(),
        })
    }

    #[instrument(skip(self, body))]
    pub async fn send_email(&self, to: &str, subject: &str, body: String) -> Result<()> {
        let email = Message::builder()
            .from(self.from_address.parse::<Mailbox>().wrap_err("Invalid sender address")?)
            .to(to.parse::<Mailbox>().wrap_err("Invalid recipient address")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .wrap_err("Building email")?;

        self.mailer
            .send(email)
            .await
            .wrap_err_with(|| format!("Sending email to {to}"))?;

        info!("Email sent");
        Ok(())
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send_otp(&self, to: &str, code: &str, valid_for_minutes: i64) -> Result<()> {
        let body = render_template(
            OTP_TEMPLATE,
            &json!({
                "otp": code,
                "minutes": valid_for_minutes,
                "platformName": self.platform_name,
            }),
        )?;
        let subject = format!("{} admin login code", self.platform_name);
        self.send_email(to, &subject, body).await
    }
}

/// Replaces every `{{key}}` in `template` with the matching value from `data`.
pub fn render_template(template: &str, data: &Value) -> Result<String> {
    let fields = data
        .as_object()
        .ok_or_else(|| eyre!("Template data must be a JSON object"))?;

    let mut body = template.to_string();
    for (key, value) in fields {
        let placeholder = format!("{{{{{}}}}}", key);
        let replacement = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        body = body.replace(&placeholder, &replacement);
    }
    Ok(body)
}
