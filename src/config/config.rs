use std::str::FromStr;
use std::time::Duration;

use actix_web::http::Uri;
use color_eyre::Result;
use dotenv::dotenv;
use eyre::{WrapErr, bail, ensure};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use crate::models::normalize_email;

const DEFAULT_CORS_ORIGINS: [&str; 2] = ["https://ecocarbon.onrender.com", "http://localhost:5173"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_schema: String,
    pub session_secret: String,
    pub cookie_secure: bool,
    pub session_ttl_hours: i64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    #[serde(default)]
    pub smtp_from: Option<String>,
    pub smtp_timeout_secs: u64,
    pub admin_email: String,
    pub platform_name: String,
    pub otp_ttl_minutes: i64,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        info!("Initializing configuration");
        Self::from_source(config::Environment::default())
    }

    /// Builds the configuration from an environment source, applying defaults
    /// and normalizing the admin email.
    pub fn from_source(env: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("db_schema", "public")?
            .set_default("cookie_secure", true)?
            .set_default("session_ttl_hours", 8)?
            .set_default("smtp_host", "smtp.gmail.com")?
            .set_default("smtp_port", 587)?
            .set_default("smtp_username", "")?
            .set_default("smtp_password", "")?
            .set_default("smtp_timeout_secs", 10)?
            .set_default("platform_name", "EcoCarbon")?
            .set_default("otp_ttl_minutes", 10)?
            .set_default("cors_origins", DEFAULT_CORS_ORIGINS.to_vec())?
            .add_source(
                env.try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()
            .wrap_err("Building configuration")?;

        let mut config: Config = settings
            .try_deserialize()
            .wrap_err("loading configuration from environment")?;

        config.admin_email = normalize_email(&config.admin_email);
        config.cors_origins = config
            .cors_origins
            .iter()
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.database_url.trim().is_empty(), "DATABASE_URL must be set");
        ensure!(
            self.session_secret.len() >= 64,
            "SESSION_SECRET must be at least 64 bytes"
        );
        ensure!(!self.admin_email.is_empty(), "ADMIN_EMAIL must be set");
        ensure!(self.otp_ttl_minutes > 0, "OTP_TTL_MINUTES must be positive");
        ensure!(self.session_ttl_hours > 0, "SESSION_TTL_HOURS must be positive");
        ensure!(
            !self.db_schema.is_empty()
                && self
                    .db_schema
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_'),
            "DB_SCHEMA must be a plain identifier"
        );
        ensure!(!self.cors_origins.is_empty(), "CORS_ORIGINS must not be empty");
        for origin in &self.cors_origins {
            validate_origin(origin)?;
        }
        Ok(())
    }

    pub fn smtp_from(&self) -> &str {
        self.smtp_from
            .as_deref()
            .filter(|from| !from.is_empty())
            .unwrap_or(&self.smtp_username)
    }

    pub fn otp_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.otp_ttl_minutes)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }

    pub async fn db_pool(&self) -> Result<PgPool> {
        info!(schema = %self.db_schema, "Initializing database pool");
        let options = PgConnectOptions::from_str(&self.database_url)
            .wrap_err("Parsing DATABASE_URL")?
            .options([("search_path", self.db_schema.as_str())]);

        PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .wrap_err("Creating database pool")
    }
}

/// Credentialed CORS needs exact origins: `http(s)://host[:port]`, never `*`.
fn validate_origin(origin: &str) -> Result<()> {
    let uri: Uri = origin
        .parse()
        .wrap_err_with(|| format!("CORS origin {origin:?} is not a valid URI"))?;

    match uri.scheme_str() {
        Some("http" | "https") => {}
        _ => bail!("CORS origin {origin:?} must use http or https"),
    }
    ensure!(
        uri.host().is_some_and(|host| !host.is_empty()),
        "CORS origin {origin:?} has no host"
    );
    ensure!(
        matches!(uri.path(), "" | "/") && uri.query().is_none(),
        "CORS origin {origin:?} must not carry a path or query"
    );
    Ok(())
}
