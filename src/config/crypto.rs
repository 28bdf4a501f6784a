use actix_web::web;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, Version};
use color_eyre::Result;
use rand::Rng;
use rand_core::OsRng;
use tracing::instrument;

pub const OTP_LENGTH: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct CryptoService;

impl CryptoService {
    fn argon2() -> Result<Argon2<'static>> {
        let params = Params::new(
            32_768, // 32 MB
            3,      // iterations
            1,      // parallelism
            None,
        )
        .map_err(|e| eyre::eyre!("Failed to create Argon2 params: {e}"))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    #[instrument(skip(self, code))]
    pub fn hash_code(&self, code: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Self::argon2()?;

        let hash = argon2
            .hash_password(code.as_bytes(), &salt)
            .map_err(|e| eyre::eyre!("Failed to hash OTP code: {e}"))?
            .to_string();

        Ok(hash)
    }

    #[instrument(skip(self, code, hash))]
    pub fn verify_code(&self, code: &str, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| eyre::eyre!("Invalid OTP hash format: {e}"))?;

        let argon2 = Self::argon2()?;

        match argon2.verify_password(code.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(eyre::eyre!("OTP verification failed: {e}")),
        }
    }

    /// Hashes on the blocking thread pool so argon2 never stalls an actix worker.
    pub async fn hash_code_offloaded(&self, code: String) -> Result<String> {
        let crypto = self.clone();
        web::block(move || crypto.hash_code(&code))
            .await
            .map_err(|e| eyre::eyre!("OTP hashing task failed: {e}"))?
    }

    /// [`verify_code`](Self::verify_code) on the blocking thread pool.
    pub async fn verify_code_offloaded(&self, code: String, hash: String) -> Result<bool> {
        let crypto = self.clone();
        web::block(move || crypto.verify_code(&code, &hash))
            .await
            .map_err(|e| eyre::eyre!("OTP verification task failed: {e}"))?
    }

    /// Uniform over `000000..=999999`; leading zeros are kept.
    pub fn generate_otp_code(&self) -> String {
        let code = rand::thread_rng().gen_range(0..1_000_000u32);
        format!("{code:0width$}", width = OTP_LENGTH)
    }

    pub fn is_well_formed_code(code: &str) -> bool {
        code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
    }
}
