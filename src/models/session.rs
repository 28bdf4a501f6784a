use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Admin state carried in the client's session cookie. `session_id` points at
/// the server-side [`AdminSessionRecord`]; the cookie alone never authorizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub authenticated: bool,
    pub email: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl AdminSession {
    pub fn authenticated(email: &str, session_id: &str) -> Self {
        Self {
            authenticated: true,
            email: Some(email.to_string()),
            session_id: Some(session_id.to_string()),
        }
    }

    /// The flag alone is not enough: the bound email must also be the admin's.
    pub fn is_admin(&self, admin_email: &str) -> bool {
        self.authenticated && self.email.as_deref() == Some(admin_email)
    }
}

/// Server-side record of a signed-in admin. Deleting it revokes every copy of
/// the cookie that refers to it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AdminSessionRecord {
    pub session_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminSessionRecord {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
