use actix_cors::Cors;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::http::{Method, header};
use actix_web::web;

use crate::controllers::{admin_controller, contact_controller, health_controller};
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "contact_desk_session";

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_controller::health))
            .route("/contact", web::post().to(contact_controller::submit_contact))
            .route("/contacts", web::get().to(contact_controller::list_contacts))
            .service(
                web::scope("/admin")
                    .route("/send-otp", web::post().to(admin_controller::send_otp))
                    .route("/verify-otp", web::post().to(admin_controller::verify_otp))
                    .route("/logout", web::post().to(admin_controller::logout))
                    .route("/check-auth", web::get().to(admin_controller::check_auth)),
            ),
    );
}

/// Reports malformed JSON bodies in the same `{"error": ...}` shape as every
/// other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

pub fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}

/// Cross-site credentialed requests need `SameSite=None`, which browsers only
/// honour on secure cookies.
pub fn session_middleware(
    key: Key,
    secure: bool,
    ttl_hours: i64,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(secure)
        .cookie_http_only(true)
        .cookie_same_site(if secure { SameSite::None } else { SameSite::Lax })
        .cookie_content_security(CookieContentSecurity::Private)
        .session_lifecycle(PersistentSession::default().session_ttl(time::Duration::hours(ttl_hours)))
        .build()
}
