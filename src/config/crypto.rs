use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, Version};
use color_eyre::Result;
use rand::Rng;
use rand_core::OsRng;
use tracing::instrument;

/// Password hashing and OTP generation. Verification goes through the
/// argon2 crate and is constant-time; the OTP is drawn from the OS RNG
/// because it is a security code, not a display token.
#[derive(Debug, Clone, Copy)]
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

    #[instrument(skip(self, password))]
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Self::argon2()?;

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| eyre::eyre!("Failed to hash password: {e}"))?
            .to_string();

        Ok(hash)
    }

    #[instrument(skip(self, password, hash))]
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| eyre::eyre!("Invalid password hash format: {e}"))?;

        let argon2 = Self::argon2()?;

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(eyre::eyre!("Password verification failed: {e}")),
        }
    }

    /// Six decimal digits, never with a leading zero.
    pub fn generate_otp(&self) -> String {
        let code: u32 = OsRng.gen_range(100_000..999_999);
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let crypto = CryptoService;
        let hash = crypto.hash_password("secret1").unwrap();

        assert_ne!(hash, "secret1");
        assert!(crypto.verify_password("secret1", &hash).unwrap());
        assert!(!crypto.verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        let crypto = CryptoService;
        assert!(crypto.verify_password("secret1", "not-a-phc-string").is_err());
    }

    #[test]
    fn otp_is_always_six_digits_in_range() {
        let crypto = CryptoService;
        for _ in 0..10_000 {
            let otp = crypto.generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));

            let value: u32 = otp.parse().unwrap();
            assert!((100_000..999_999).contains(&value), "out of range: {value}");
        }
    }
}
