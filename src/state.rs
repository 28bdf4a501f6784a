use crate::service::contact_service::ContactService;
use crate::service::otp_service::OtpService;
use crate::service::session_gate::SessionGate;

/// Shared by every handler through `web::Data`.
pub struct AppState {
    pub contacts: ContactService,
    pub otp: OtpService,
    pub sessions: SessionGate,
}
