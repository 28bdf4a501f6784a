use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::otp_codes::{SendOtpRequest, VerifyOtpRequest};
use crate::state::AppState;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn send_otp(
    state: web::Data<AppState>,
    request: web::Json<SendOtpRequest>,
) -> AppResult<HttpResponse> {
    let email = present(&request.email).ok_or(AppError::MissingFields(vec!["email"]))?;

    let issued = state.otp.request(email).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "OTP sent to admin email",
        "expires_at": issued.expires_at,
    })))
}

pub async fn verify_otp(
    state: web::Data<AppState>,
    session: Session,
    request: web::Json<VerifyOtpRequest>,
) -> AppResult<HttpResponse> {
    let (email, code) = match (present(&request.email), present(&request.code)) {
        (Some(email), Some(code)) => (email, code),
        (email, code) => {
            let missing = [("email", email.is_none()), ("code", code.is_none())]
                .into_iter()
                .filter_map(|(field, missing)| missing.then_some(field))
                .collect();
            return Err(AppError::MissingFields(missing));
        }
    };

    let email = state.otp.verify(email, code).await?;
    state.sessions.authorize(&session, &email).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "authenticated": true,
    })))
}

pub async fn logout(state: web::Data<AppState>, session: Session) -> AppResult<HttpResponse> {
    state.sessions.clear(&session).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out" })))
}

pub async fn check_auth(
    state: web::Data<AppState>,
    session: Session,
) -> AppResult<HttpResponse> {
    let current = state.sessions.current(&session).await?;
    let authenticated = current.is_admin(state.otp.admin_email());
    let email = current.email.filter(|_| authenticated);

    Ok(HttpResponse::Ok().json(json!({
        "authenticated": authenticated,
        "email": email,
    })))
}
