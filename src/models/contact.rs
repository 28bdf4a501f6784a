use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    pub service: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Raw contact form body. Every field is optional on the wire so that absent
/// required fields can be reported as a validation failure rather than a
/// deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewContact {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 320))]
    pub email: String,
    #[validate(length(max = 200))]
    pub company: String,
    #[validate(length(max = 200))]
    pub phone: String,
    #[validate(length(max = 200))]
    pub service: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

impl SubmitContactRequest {
    /// Splits the request into a storable contact, or the names of the
    /// required fields that were absent or blank.
    pub fn into_new_contact(self) -> Result<NewContact, Vec<&'static str>> {
        let name = required(self.name);
        let email = required(self.email);
        let message = required(self.message);

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) => Ok(NewContact {
                name,
                email,
                company: optional(self.company),
                phone: optional(self.phone),
                service: optional(self.service),
                message,
            }),
            (name, email, message) => Err([
                ("name", name.is_none()),
                ("email", email.is_none()),
                ("message", message.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect()),
        }
    }
}
