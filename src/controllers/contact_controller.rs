use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::error::AppResult;
use crate::models::contact::SubmitContactRequest;
use crate::state::AppState;

pub async fn submit_contact(
    state: web::Data<AppState>,
    request: web::Json<SubmitContactRequest>,
) -> AppResult<HttpResponse> {
    state.contacts.submit(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Form submitted successfully!"
    })))
}

pub async fn list_contacts(
    state: web::Data<AppState>,
    session: Session,
) -> AppResult<HttpResponse> {
    state.sessions.require_admin(&session).await?;

    let contacts = state.contacts.list().await?;
    Ok(HttpResponse::Ok().json(contacts))
}
