//! In-memory stores used by the service and handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use eyre::{Result, eyre};

use super::{AdminSessionStore, ContactStore, OtpStore};
use crate::models::contact::{Contact, NewContact};
use crate::models::otp_codes::{NewOtpChallenge, OtpChallenge};
use crate::models::session::AdminSessionRecord;

#[derive(Default)]
pub struct MemoryContactStore {
    rows: Mutex<Vec<Contact>>,
}

impl MemoryContactStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, contact: NewContact) -> Result<Contact> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        // Strictly increasing timestamps keep the ordering deterministic.
        let created_at = rows
            .last()
            .map(|last| last.created_at + Duration::milliseconds(1))
            .unwrap_or_else(Utc::now)
            .max(Utc::now());
        let row = Contact {
            id,
            name: contact.name,
            email: contact.email,
            company: contact.company,
            phone: contact.phone,
            service: contact.service,
            message: contact.message,
            created_at,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<Contact>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

/// Contact store whose backend is always down.
pub struct FailingContactStore;

#[async_trait]
impl ContactStore for FailingContactStore {
    async fn insert(&self, _contact: NewContact) -> Result<Contact> {
        Err(eyre!("connection refused"))
    }

    async fn list(&self) -> Result<Vec<Contact>> {
        Err(eyre!("connection refused"))
    }
}

#[derive(Default)]
pub struct MemoryOtpStore {
    rows: Mutex<Vec<OtpChallenge>>,
    next_id: Mutex<i64>,
}

impl MemoryOtpStore {
    pub fn all(&self) -> Vec<OtpChallenge> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn purge_stale(&self, email: &str, now: DateTime<Utc>) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.email != email || c.is_live(now));
        Ok((before - rows.len()) as u64)
    }

    async fn insert(&self, challenge: NewOtpChallenge) -> Result<OtpChallenge> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let row = OtpChallenge {
            id: *next_id,
            email: challenge.email,
            code_hash: challenge.code_hash,
            issued_at: challenge.issued_at,
            expires_at: challenge.expires_at,
            consumed: false,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<OtpChallenge>> {
        let mut rows: Vec<OtpChallenge> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.email == email)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.issued_at.cmp(&a.issued_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn consume(&self, id: i64) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|c| c.id == id && !c.consumed) {
            Some(row) => {
                row.consumed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryAdminSessionStore {
    rows: Mutex<Vec<AdminSessionRecord>>,
}

impl MemoryAdminSessionStore {
    pub fn all(&self) -> Vec<AdminSessionRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdminSessionStore for MemoryAdminSessionStore {
    async fn create(&self, record: &AdminSessionRecord) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.session_id == record.session_id) {
            return Err(eyre!("duplicate session id"));
        }
        rows.push(record.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AdminSessionRecord>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.session_id == session_id && r.is_active(now))
            .cloned())
    }

    async fn revoke(&self, session_id: &str) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.session_id != session_id);
        Ok(rows.len() < before)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.is_active(now));
        Ok((before - rows.len()) as u64)
    }
}
