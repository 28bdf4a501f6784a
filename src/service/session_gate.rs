//! Admin authorization: a session id in the actix session cookie, checked
//! against a server-side record on every request.

use std::sync::Arc;

use actix_session::Session;
use chrono::{Duration, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::normalize_email;
use crate::models::session::{AdminSession, AdminSessionRecord};
use crate::store::AdminSessionStore;

const ADMIN_SESSION_KEY: &str = "admin";
const SESSION_ID_LENGTH: usize = 64;

fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LENGTH)
        .map(char::from)
        .collect()
}

pub struct SessionGate {
    store: Arc<dyn AdminSessionStore>,
    admin_email: String,
    lifetime: Duration,
}

impl SessionGate {
    pub fn new(store: Arc<dyn AdminSessionStore>, admin_email: &str, lifetime: Duration) -> Self {
        Self {
            store,
            admin_email: normalize_email(admin_email),
            lifetime,
        }
    }

    /// Marks the session as the authenticated admin. Only call after a
    /// successful OTP verification.
    #[instrument(skip(self, session))]
    pub async fn authorize(&self, session: &Session, email: &str) -> AppResult<()> {
        let now = Utc::now();
        let purged = self.store.purge_expired(now).await?;
        if purged > 0 {
            info!(purged, "Purged expired admin sessions");
        }

        let record = AdminSessionRecord {
            session_id: generate_session_id(),
            email: email.to_string(),
            created_at: now,
            expires_at: now + self.lifetime,
        };
        self.store.create(&record).await?;

        session.renew();
        session
            .insert(
                ADMIN_SESSION_KEY,
                AdminSession::authenticated(email, &record.session_id),
            )
            .map_err(|e| AppError::Internal(eyre::eyre!("Failed to write session: {e}")))
    }

    /// Admin state from the cookie. Unreadable state is treated as signed out.
    fn cookie_state(session: &Session) -> AdminSession {
        match session.get::<AdminSession>(ADMIN_SESSION_KEY) {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable admin session");
                AdminSession::default()
            }
        }
    }

    /// Current admin state. A cookie whose server-side record is gone or
    /// expired counts as signed out.
    pub async fn current(&self, session: &Session) -> AppResult<AdminSession> {
        let state = Self::cookie_state(session);
        let Some(session_id) = state.session_id.as_deref() else {
            return Ok(AdminSession::default());
        };

        match self.store.find_active(session_id, Utc::now()).await? {
            Some(record) if state.email.as_deref() == Some(record.email.as_str()) => Ok(state),
            _ => Ok(AdminSession::default()),
        }
    }

    pub async fn check(&self, session: &Session) -> AppResult<bool> {
        Ok(self.current(session).await?.is_admin(&self.admin_email))
    }

    /// Fails closed unless the session belongs to the admin.
    pub async fn require_admin(&self, session: &Session) -> AppResult<()> {
        if self.check(session).await? {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }

    /// Revokes the server-side record and purges the cookie.
    pub async fn clear(&self, session: &Session) -> AppResult<()> {
        let state = Self::cookie_state(session);
        session.remove(ADMIN_SESSION_KEY);
        session.purge();

        if let Some(session_id) = state.session_id.as_deref() {
            if self.store.revoke(session_id).await? {
                info!("Admin session revoked");
            }
        }
        Ok(())
    }
}
