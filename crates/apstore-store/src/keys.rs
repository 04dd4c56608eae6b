//! Actor private keys and their published public halves.

use std::fmt;

use apstore_types::{Iri, PublicKey};
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::EncodePublicKey;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::memory::MemoryStorage;
use crate::traits::KeyStorage;

/// A private key of one of the supported algorithms.
#[derive(Clone)]
pub enum PrivateKey {
    Ed25519(ed25519_dalek::SigningKey),
    Rsa(rsa::RsaPrivateKey),
    EcdsaP256(p256::ecdsa::SigningKey),
}

impl PrivateKey {
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Ed25519(_) => "Ed25519",
            Self::Rsa(_) => "RSA",
            Self::EcdsaP256(_) => "ECDSA-P256",
        }
    }

    /// SPKI PEM of the public half.
    pub fn public_key_pem(&self) -> StorageResult<String> {
        let encoded = match self {
            Self::Ed25519(key) => key.verifying_key().to_public_key_pem(LineEnding::LF),
            Self::Rsa(key) => key.to_public_key().to_public_key_pem(LineEnding::LF),
            Self::EcdsaP256(key) => {
                p256::PublicKey::from(key.verifying_key()).to_public_key_pem(LineEnding::LF)
            }
        };
        encoded.map_err(|e| {
            StorageError::Internal(format!("encode {} public key: {e}", self.algorithm()))
        })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({})", self.algorithm())
    }
}

impl From<ed25519_dalek::SigningKey> for PrivateKey {
    fn from(key: ed25519_dalek::SigningKey) -> Self {
        Self::Ed25519(key)
    }
}

impl From<rsa::RsaPrivateKey> for PrivateKey {
    fn from(key: rsa::RsaPrivateKey) -> Self {
        Self::Rsa(key)
    }
}

impl From<p256::ecdsa::SigningKey> for PrivateKey {
    fn from(key: p256::ecdsa::SigningKey) -> Self {
        Self::EcdsaP256(key)
    }
}

/// The id of an actor's published key: `<iri>#main`.
pub fn public_key_id(owner: &Iri) -> Iri {
    Iri::new(format!("{owner}#main"))
}

/// The public half of `key` as published on `owner`'s actor document.
pub fn public_key(owner: &Iri, key: &PrivateKey) -> StorageResult<PublicKey> {
    Ok(PublicKey {
        id: public_key_id(owner),
        owner: owner.clone(),
        public_key_pem: key.public_key_pem()?,
    })
}

impl KeyStorage for MemoryStorage {
    fn save_key(&self, iri: &Iri, key: PrivateKey) -> StorageResult<PublicKey> {
        iri.validate()?;
        let public = public_key(iri, &key)?;
        debug!(iri = %iri, key_id = %public.id, algorithm = key.algorithm(), "saved private key");
        self.keys.insert(iri.clone(), key);
        Ok(public)
    }

    fn load_key(&self, iri: &Iri) -> StorageResult<PrivateKey> {
        self.keys
            .get(iri)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found("private key for", iri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, Verifier};
    use p256::pkcs8::DecodePrivateKey;

    const RSA_KEY: &str = include_str!("testdata/rsa2048.key.pem");
    const RSA_PUB: &str = include_str!("testdata/rsa2048.pub.pem");
    const P256_KEY: &str = include_str!("testdata/p256.key.pem");
    const P256_PUB: &str = include_str!("testdata/p256.pub.pem");

    fn jdoe() -> Iri {
        Iri::new("https://example.com/~jdoe")
    }

    fn rsa_key() -> rsa::RsaPrivateKey {
        rsa::RsaPrivateKey::from_pkcs8_pem(RSA_KEY).unwrap()
    }

    fn p256_key() -> p256::ecdsa::SigningKey {
        p256::ecdsa::SigningKey::from_pkcs8_pem(P256_KEY).unwrap()
    }

    fn all_keys() -> Vec<PrivateKey> {
        vec![
            ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]).into(),
            rsa_key().into(),
            p256_key().into(),
        ]
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    #[test]
    fn rsa_public_pem_matches_openssl() {
        let pem = PrivateKey::from(rsa_key()).public_key_pem().unwrap();
        assert_eq!(pem, RSA_PUB);
    }

    #[test]
    fn p256_public_pem_matches_openssl() {
        let pem = PrivateKey::from(p256_key()).public_key_pem().unwrap();
        assert_eq!(pem, P256_PUB);
    }

    #[test]
    fn debug_hides_key_material() {
        let key = PrivateKey::from(rsa_key());
        assert_eq!(format!("{key:?}"), "PrivateKey(RSA)");
    }

    // -----------------------------------------------------------------------
    // Storage
    // -----------------------------------------------------------------------

    #[test]
    fn every_algorithm_roundtrips() {
        let store = MemoryStorage::default();
        let keys = store.key_storage().unwrap();
        for key in all_keys() {
            let public = keys.save_key(&jdoe(), key.clone()).unwrap();
            assert_eq!(public.id.as_str(), "https://example.com/~jdoe#main");
            assert_eq!(public.owner, jdoe());
            assert!(public.public_key_pem.starts_with("-----BEGIN PUBLIC KEY-----\n"));
            assert!(public.public_key_pem.trim_end().ends_with("-----END PUBLIC KEY-----"));

            let loaded = keys.load_key(&jdoe()).unwrap();
            assert_eq!(loaded.algorithm(), key.algorithm());
            assert_eq!(loaded.public_key_pem().unwrap(), public.public_key_pem);
        }
    }

    #[test]
    fn loaded_ed25519_key_signs() {
        let store = MemoryStorage::default();
        let key = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
        store.save_key(&jdoe(), key.clone().into()).unwrap();
        let PrivateKey::Ed25519(loaded) = store.load_key(&jdoe()).unwrap() else {
            panic!("wrong algorithm");
        };
        let sig = loaded.sign(b"hello");
        assert!(key.verifying_key().verify(b"hello", &sig).is_ok());
    }

    #[test]
    fn loaded_rsa_key_is_identical() {
        let store = MemoryStorage::default();
        store.save_key(&jdoe(), rsa_key().into()).unwrap();
        let PrivateKey::Rsa(loaded) = store.load_key(&jdoe()).unwrap() else {
            panic!("wrong algorithm");
        };
        assert_eq!(loaded, rsa_key());
    }

    #[test]
    fn load_missing_key_is_not_found() {
        let store = MemoryStorage::default();
        assert!(store.load_key(&jdoe()).unwrap_err().is_not_found());
    }

    #[test]
    fn save_overwrites_previous_key() {
        let store = MemoryStorage::default();
        store.save_key(&jdoe(), rsa_key().into()).unwrap();
        let second = p256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
        let public = store.save_key(&jdoe(), second.clone().into()).unwrap();
        assert_eq!(store.load_key(&jdoe()).unwrap().algorithm(), "ECDSA-P256");
        assert_eq!(public, public_key(&jdoe(), &second.into()).unwrap());
    }
}
