use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

use crate::config::crypto::CryptoService;
use crate::error::{AppError, AppResult, OtpRejection};
use crate::models::normalize_email;
use crate::models::otp_codes::NewOtpChallenge;
use crate::service::email_service::Mailer;
use crate::store::OtpStore;

/// Live challenges checked per verification, newest first. Each check is a
/// full argon2 run, so older outstanding codes beyond this stop working.
pub const MAX_VERIFY_CANDIDATES: usize = 3;

/// Result of a successful OTP request.
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub expires_at: DateTime<Utc>,
}

pub struct OtpService {
    store: Arc<dyn OtpStore>,
    mailer: Arc<dyn Mailer>,
    crypto: CryptoService,
    admin_email: String,
    validity: Duration,
}

impl OtpService {
    pub fn new(
        store: Arc<dyn OtpStore>,
        mailer: Arc<dyn Mailer>,
        crypto: CryptoService,
        admin_email: &str,
        validity: Duration,
    ) -> Self {
        Self {
            store,
            mailer,
            crypto,
            admin_email: normalize_email(admin_email),
            validity,
        }
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// Normalizes `email` and rejects anyone but the configured admin.
    fn admin_only(&self, email: &str) -> AppResult<String> {
        let email = normalize_email(email);
        if email != self.admin_email {
            warn!("OTP attempt for non-admin email");
            return Err(AppError::Forbidden);
        }
        Ok(email)
    }

    #[instrument(skip(self))]
    pub async fn request(&self, email: &str) -> AppResult<IssuedOtp> {
        let email = self.admin_only(email)?;
        let now = Utc::now();

        let purged = self.store.purge_stale(&email, now).await?;
        if purged > 0 {
            info!(purged, "Purged stale OTP codes");
        }

        let code = self.crypto.generate_otp_code();
        let challenge = self
            .store
            .insert(NewOtpChallenge {
                email: email.clone(),
                code_hash: self.crypto.hash_code_offloaded(code.clone()).await?,
                issued_at: now,
                expires_at: now + self.validity,
            })
            .await?;

        // The challenge stays stored on failure; it is purged once stale.
        self.mailer
            .send_otp(&email, &code, self.validity.num_minutes())
            .await
            .map_err(AppError::Delivery)?;

        info!(otp_id = challenge.id, expires_at = %challenge.expires_at, "OTP issued");
        Ok(IssuedOtp {
            expires_at: challenge.expires_at,
        })
    }

    /// Accepts `code` at most once. Returns the normalized admin email.
    #[instrument(skip(self, code))]
    pub async fn verify(&self, email: &str, code: &str) -> AppResult<String> {
        let email = self.admin_only(email)?;
        let code = code.trim();
        let now = Utc::now();

        let challenges = self.store.find_by_email(&email).await?;
        if challenges.is_empty() {
            return Err(self.reject(OtpRejection::NotRequested));
        }

        let live: Vec<_> = challenges
            .into_iter()
            .filter(|c| c.is_live(now))
            .take(MAX_VERIFY_CANDIDATES)
            .collect();
        if live.is_empty() {
            return Err(self.reject(OtpRejection::Expired));
        }

        if CryptoService::is_well_formed_code(code) {
            for challenge in live {
                let matched = self
                    .crypto
                    .verify_code_offloaded(code.to_string(), challenge.code_hash)
                    .await?;
                if !matched {
                    continue;
                }
                if self.store.consume(challenge.id).await? {
                    info!(otp_id = challenge.id, "OTP verified");
                    return Ok(email);
                }
            }
        }

        Err(self.reject(OtpRejection::Invalid))
    }

    fn reject(&self, reason: OtpRejection) -> AppError {
        warn!(%reason, "OTP rejected");
        AppError::OtpRejected(reason)
    }
}
