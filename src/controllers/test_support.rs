//! Shared fixtures for the HTTP handler tests.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error, test, web};
use chrono::Duration;
use serde_json::json;

use crate::config::crypto::CryptoService;
use crate::config::routes::{SESSION_COOKIE, json_config, routes, session_middleware};
use crate::service::contact_service::ContactService;
use crate::service::email_service::testing::RecordingMailer;
use crate::service::otp_service::OtpService;
use crate::service::session_gate::SessionGate;
use crate::state::AppState;
use crate::store::memory::{MemoryAdminSessionStore, MemoryContactStore, MemoryOtpStore};

pub const ADMIN: &str = "admin@example.com";

pub struct TestApp {
    pub contacts: Arc<MemoryContactStore>,
    pub otps: Arc<MemoryOtpStore>,
    pub sessions: Arc<MemoryAdminSessionStore>,
    pub mailer: Arc<RecordingMailer>,
    state: web::Data<AppState>,
    key: Key,
}

impl TestApp {
    pub fn new() -> Self {
        let contacts = Arc::new(MemoryContactStore::default());
        let otps = Arc::new(MemoryOtpStore::default());
        let sessions = Arc::new(MemoryAdminSessionStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let state = web::Data::new(AppState {
            contacts: ContactService::new(contacts.clone()),
            otp: OtpService::new(
                otps.clone(),
                mailer.clone(),
                CryptoService,
                ADMIN,
                Duration::minutes(10),
            ),
            sessions: SessionGate::new(sessions.clone(), ADMIN, Duration::hours(8)),
        });

        Self {
            contacts,
            otps,
            sessions,
            mailer,
            state,
            key: Key::generate(),
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(session_middleware(self.key.clone(), false, 8))
            .app_data(self.state.clone())
            .app_data(json_config())
            .configure(routes)
    }
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

/// Runs the full OTP flow for `email` and returns the session cookie.
pub async fn login<S, B>(app: &S, mailer: &RecordingMailer, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let resp = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/admin/send-otp")
            .set_json(json!({ "email": email }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let code = mailer.last_code().expect("an OTP was mailed");
    let resp = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/admin/verify-otp")
            .set_json(json!({ "email": email, "code": code }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    session_cookie(&resp).expect("verify sets the session cookie")
}
