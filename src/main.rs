mod config;
mod controllers;
mod error;
mod models;
mod service;
mod state;
mod store;

use std::sync::Arc;

use actix_web::{App, HttpServer, cookie::Key, middleware::Logger, web};
use color_eyre::Result;
use eyre::WrapErr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::crypto::CryptoService;
use crate::config::routes::{cors, json_config, routes, session_middleware};
use crate::service::contact_service::ContactService;
use crate::service::email_service::EmailService;
use crate::service::otp_service::OtpService;
use crate::service::session_gate::SessionGate;
use crate::state::AppState;
use crate::store::postgres::{PgAdminSessionStore, PgContactStore, PgOtpStore};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::config::Config::from_env()?;
    let pool = config.db_pool().await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .wrap_err("Running database migrations")?;

    let mailer = Arc::new(EmailService::new(&config)?);
    let state = web::Data::new(AppState {
        contacts: ContactService::new(Arc::new(PgContactStore::new(pool.clone()))),
        otp: OtpService::new(
            Arc::new(PgOtpStore::new(pool.clone())),
            mailer,
            CryptoService,
            &config.admin_email,
            config.otp_ttl(),
        ),
        sessions: SessionGate::new(
            Arc::new(PgAdminSessionStore::new(pool)),
            &config.admin_email,
            config.session_ttl(),
        ),
    });

    let key = Key::from(config.session_secret.as_bytes());
    let bind = (config.host.clone(), config.port);
    info!(host = %bind.0, port = bind.1, origins = ?config.cors_origins, "Starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(
                key.clone(),
                config.cookie_secure,
                config.session_ttl_hours,
            ))
            .wrap(cors(&config.cors_origins))
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(json_config())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
