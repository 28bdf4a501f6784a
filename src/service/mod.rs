pub mod contact_service;
pub mod email_service;
pub mod otp_service;
pub mod session_gate;
