use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use sqlx::PgPool;

use super::{AdminSessionStore, ContactStore, OtpStore};
use crate::models::contact::{Contact, NewContact};
use crate::models::otp_codes::{NewOtpChallenge, OtpChallenge};
use crate::models::session::AdminSessionRecord;

const INSERT_CONTACT: &str = r#"
    INSERT INTO contacts (name, email, company, phone, service, message)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, name, email, company, phone, service, message, created_at
"#;

const SELECT_CONTACTS: &str = r#"
    SELECT id, name, email, company, phone, service, message, created_at
    FROM contacts
    ORDER BY created_at DESC, id DESC
"#;

const PURGE_STALE_OTPS: &str = r#"
    DELETE FROM otp_codes
    WHERE email = $1
      AND (consumed OR expires_at <= $2)
"#;

const INSERT_OTP: &str = r#"
    INSERT INTO otp_codes (email, code_hash, issued_at, expires_at)
    VALUES ($1, $2, $3, $4)
    RETURNING id, email, code_hash, issued_at, expires_at, consumed
"#;

const SELECT_OTPS_BY_EMAIL: &str = r#"
    SELECT id, email, code_hash, issued_at, expires_at, consumed
    FROM otp_codes
    WHERE email = $1
    ORDER BY issued_at DESC, id DESC
"#;

const CONSUME_OTP: &str = "UPDATE otp_codes SET consumed = TRUE WHERE id = $1 AND consumed = FALSE";

const INSERT_ADMIN_SESSION: &str = r#"
    INSERT INTO admin_sessions (session_id, email, created_at, expires_at)
    VALUES ($1, $2, $3, $4)
"#;

const SELECT_ACTIVE_ADMIN_SESSION: &str = r#"
    SELECT session_id, email, created_at, expires_at
    FROM admin_sessions
    WHERE session_id = $1 AND expires_at > $2
"#;

const DELETE_ADMIN_SESSION: &str = "DELETE FROM admin_sessions WHERE session_id = $1";

const PURGE_EXPIRED_ADMIN_SESSIONS: &str = "DELETE FROM admin_sessions WHERE expires_at <= $1";

pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, contact: NewContact) -> Result<Contact> {
        sqlx::query_as::<_, Contact>(INSERT_CONTACT)
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.company)
            .bind(&contact.phone)
            .bind(&contact.service)
            .bind(&contact.message)
            .fetch_one(&self.pool)
            .await
            .wrap_err("Failed to insert contact")
    }

    async fn list(&self) -> Result<Vec<Contact>> {
        sqlx::query_as::<_, Contact>(SELECT_CONTACTS)
            .fetch_all(&self.pool)
            .await
            .wrap_err("Failed to fetch contacts")
    }
}

pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpStore for PgOtpStore {
    async fn purge_stale(&self, email: &str, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(PURGE_STALE_OTPS)
            .bind(email)
            .bind(now)
            .execute(&self.pool)
            .await
            .wrap_err("Failed to purge stale OTP codes")?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, challenge: NewOtpChallenge) -> Result<OtpChallenge> {
        sqlx::query_as::<_, OtpChallenge>(INSERT_OTP)
            .bind(&challenge.email)
            .bind(&challenge.code_hash)
            .bind(challenge.issued_at)
            .bind(challenge.expires_at)
            .fetch_one(&self.pool)
            .await
            .wrap_err("Failed to store OTP code")
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<OtpChallenge>> {
        sqlx::query_as::<_, OtpChallenge>(SELECT_OTPS_BY_EMAIL)
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .wrap_err("Failed to fetch OTP codes")
    }

    async fn consume(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(CONSUME_OTP)
            .bind(id)
            .execute(&self.pool)
            .await
            .wrap_err("Failed to mark OTP code consumed")?;
        Ok(result.rows_affected() == 1)
    }
}

pub struct PgAdminSessionStore {
    pool: PgPool,
}

impl PgAdminSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminSessionStore for PgAdminSessionStore {
    async fn create(&self, record: &AdminSessionRecord) -> Result<()> {
        sqlx::query(INSERT_ADMIN_SESSION)
            .bind(&record.session_id)
            .bind(&record.email)
            .bind(record.created_at)
            .bind(record.expires_at)
            .execute(&self.pool)
            .await
            .wrap_err("Failed to create admin session")?;
        Ok(())
    }

    async fn find_active(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AdminSessionRecord>> {
        sqlx::query_as::<_, AdminSessionRecord>(SELECT_ACTIVE_ADMIN_SESSION)
            .bind(session_id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .wrap_err("Failed to query admin session")
    }

    async fn revoke(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query(DELETE_ADMIN_SESSION)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .wrap_err("Failed to delete admin session")?;
        Ok(result.rows_affected() == 1)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(PURGE_EXPIRED_ADMIN_SESSIONS)
            .bind(now)
            .execute(&self.pool)
            .await
            .wrap_err("Failed to purge expired admin sessions")?;
        Ok(result.rows_affected())
    }
}
