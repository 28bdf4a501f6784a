//! Persistence seams for contacts, OTP challenges and admin sessions.
//!
//! Services hold these as `Arc<dyn ...>` so the backing store is an injected
//! dependency rather than ambient process state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;

use crate::models::contact::{Contact, NewContact};
use crate::models::otp_codes::{NewOtpChallenge, OtpChallenge};
use crate::models::session::AdminSessionRecord;

pub mod postgres;

#[cfg(test)]
pub mod memory;

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Inserts a contact; the store assigns `id` and `created_at`.
    async fn insert(&self, contact: NewContact) -> Result<Contact>;

    /// All contacts, newest first.
    async fn list(&self) -> Result<Vec<Contact>>;
}

#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Deletes challenges for `email` that are consumed or expired as of `now`.
    async fn purge_stale(&self, email: &str, now: DateTime<Utc>) -> Result<u64>;

    async fn insert(&self, challenge: NewOtpChallenge) -> Result<OtpChallenge>;

    /// Every challenge stored for `email`, most recently issued first.
    async fn find_by_email(&self, email: &str) -> Result<Vec<OtpChallenge>>;

    /// Marks a challenge consumed. Returns false if it was already consumed.
    async fn consume(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait AdminSessionStore: Send + Sync {
    async fn create(&self, record: &AdminSessionRecord) -> Result<()>;

    /// The record for `session_id` if it exists and has not expired at `now`.
    async fn find_active(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AdminSessionRecord>>;

    /// Deletes the record. Returns false if it was already gone.
    async fn revoke(&self, session_id: &str) -> Result<bool>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
