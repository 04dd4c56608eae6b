use apstore_types::Iri;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::memory::MemoryStorage;
use crate::traits::PasswordStorage;

/// Hash a password with Argon2id and a fresh salt.
pub fn hash_password(password: &[u8]) -> StorageResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StorageError::Internal(format!("password hashing failed: {e}")))
}

/// Check `password` against a PHC-format hash.
pub fn verify_password(password: &[u8], hash: &str) -> StorageResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| StorageError::Internal(format!("stored password hash is malformed: {e}")))?;
    Ok(Argon2::default().verify_password(password, &parsed).is_ok())
}

impl PasswordStorage for MemoryStorage {
    fn password_set(&self, iri: &Iri, password: &[u8]) -> StorageResult<()> {
        iri.validate()?;
        let hash = hash_password(password)?;
        self.passwords.insert(iri.clone(), hash);
        debug!(iri = %iri, "password set");
        Ok(())
    }

    fn password_check(&self, iri: &Iri, password: &[u8]) -> StorageResult<()> {
        let hash = self
            .passwords
            .get(iri)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found("password for", iri))?;
        if verify_password(password, &hash)? {
            Ok(())
        } else {
            Err(StorageError::Unauthorized(format!("invalid password for {iri}")))
        }
    }
}
