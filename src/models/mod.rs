pub mod contact;
pub mod otp_codes;
pub mod session;

/// Canonical form used whenever an email is compared or stored for OTP purposes.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
