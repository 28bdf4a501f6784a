use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

/// Why a presented OTP was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRejection {
    /// No challenge was ever issued for the email.
    NotRequested,
    /// Challenges exist but none is still usable.
    Expired,
    /// A usable challenge exists but the code does not match it.
    Invalid,
}

impl fmt::Display for OtpRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            OtpRejection::NotRequested => "OTP not requested",
            OtpRejection::Expired => "OTP expired",
            OtpRejection::Invalid => "Invalid OTP",
        };
        f.write_str(message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0}")]
    Validation(String),

    /// No authenticated admin session.
    #[error("Unauthorized")]
    Unauthorized,

    /// The supplied email is not the configured admin.
    #[error("Unauthorized")]
    Forbidden,

    #[error("{0}")]
    OtpRejected(OtpRejection),

    #[error("Failed to send OTP email")]
    Delivery(eyre::Report),

    #[error("Internal error: {0}")]
    Internal(eyre::Report),
}

pub type AppResult<T> = Result<T, AppError>;

// `eyre::Report` is not a `std::error::Error`, so it cannot be a thiserror source.
impl From<eyre::Report> for AppError {
    fn from(report: eyre::Report) -> Self {
        AppError::Internal(report)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFields(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::OtpRejected(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Delivery(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::MissingFields(_) => "Missing required fields".to_string(),
            AppError::Delivery(report) => {
                tracing::error!(error = ?report, "OTP delivery failed");
                self.to_string()
            }
            AppError::Internal(report) => {
                tracing::error!(error = ?report, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({ "error": message });
        if let AppError::MissingFields(fields) = self {
            body["fields"] = json!(fields);
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
