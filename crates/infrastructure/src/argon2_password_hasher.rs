//! Account password storage.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=19456,t=2,p=1$...`). The hasher
//! also keeps one decoy hash so sign-in can run a full verification when the
//! username matches no account.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use classbook_application::PasswordHasher as PasswordHasherPort;
use classbook_core::{AppError, AppResult};

const MEMORY_COST_KIB: u32 = 19_456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

const DECOY_PASSWORD: &str = "classbook-decoy-account-password";

/// Argon2id password hasher for classbook accounts.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
    decoy_hash: String,
}

impl Argon2PasswordHasher {
    /// Builds the hasher and precomputes its decoy hash.
    pub fn new() -> AppResult<Self> {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
            .map_err(|error| AppError::Internal(format!("invalid argon2 parameters: {error}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy_hash = phc_hash(&argon2, DECOY_PASSWORD)?;

        Ok(Self { argon2, decoy_hash })
    }
}

fn phc_hash(argon2: &Argon2<'_>, password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))
}

impl PasswordHasherPort for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        phc_hash(&self.argon2, password)
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let stored = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("stored password hash is unreadable: {error}"))
        })?;

        match self.argon2.verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password verification failed: {error}"
            ))),
        }
    }

    fn decoy_hash(&self) -> &str {
        &self.decoy_hash
    }
}

#[cfg(test)]
mod tests {
    use classbook_application::PasswordHasher as PasswordHasherPort;
    use classbook_core::{AppError, AppResult};

    use super::{Argon2PasswordHasher, DECOY_PASSWORD};

    #[test]
    fn hashes_verify_only_the_original_password() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new()?;
        let hash = hasher.hash_password("correct horse battery")?;

        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(hasher.verify_password("correct horse battery", &hash)?);
        assert!(!hasher.verify_password("correct horse", &hash)?);
        Ok(())
    }

    #[test]
    fn same_password_gets_distinct_salts() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new()?;
        assert_ne!(
            hasher.hash_password("repeat-me-please")?,
            hasher.hash_password("repeat-me-please")?
        );
        Ok(())
    }

    #[test]
    fn decoy_hash_is_a_real_argon2id_hash() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new()?;

        assert!(hasher.decoy_hash().starts_with("$argon2id$"));
        assert!(hasher.verify_password(DECOY_PASSWORD, hasher.decoy_hash())?);
        assert!(!hasher.verify_password("correct horse battery", hasher.decoy_hash())?);
        Ok(())
    }

    #[test]
    fn unreadable_hash_is_an_internal_error() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new()?;
        assert!(matches!(
            hasher.verify_password("anything", "plaintext"),
            Err(AppError::Internal(_))
        ));
        Ok(())
    }
}
