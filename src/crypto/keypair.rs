//! BLS12-381 keypair derivation.

use std::fmt;

use blst::min_pk::{PublicKey, SecretKey};

use super::{EncodedKey, KeyFormat};
use crate::error::SearchError;

/// Length of the key generation seed (input keying material).
pub const SEED_LEN: usize = 32;

/// Random input keying material for a single attempt.
pub type Seed = [u8; SEED_LEN];

/// A secret key and the G1 public key derived from it.
#[derive(Clone)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Derives a keypair from `seed` with the standard BLS `KeyGen`
    /// (HKDF-based, empty key info). The same seed always yields the
    /// same keypair.
    #[inline]
    pub fn derive(seed: &Seed) -> Result<Self, SearchError> {
        let secret_key = SecretKey::key_gen(seed, &[])
            .map_err(|e| SearchError::KeyDerivation(format!("{:?}", e)))?;
        let public_key = secret_key.sk_to_pk();

        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// Serializes the public key in `format`.
    #[inline]
    pub fn encode(&self, format: KeyFormat) -> EncodedKey {
        format.encode(&self.public_key)
    }

    /// Returns the secret key bytes (big-endian scalar).
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.secret_key.to_bytes()
    }

    /// Returns the secret key as a hex string (without 0x prefix).
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.secret_key_bytes())
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.encode(KeyFormat::Compressed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let seed = [0x42u8; SEED_LEN];
        let first = KeyPair::derive(&seed).unwrap();
        let second = KeyPair::derive(&seed).unwrap();

        assert_eq!(first.secret_key_bytes(), second.secret_key_bytes());
        for format in [KeyFormat::Full, KeyFormat::Compressed] {
            assert_eq!(
                first.encode(format).as_bytes(),
                second.encode(format).as_bytes()
            );
        }
    }

    #[test]
    fn test_different_seeds_give_different_keys() {
        let a = KeyPair::derive(&[1u8; SEED_LEN]).unwrap();
        let b = KeyPair::derive(&[2u8; SEED_LEN]).unwrap();
        assert_ne!(a.secret_key_bytes(), b.secret_key_bytes());
        assert_ne!(
            a.encode(KeyFormat::Full).as_bytes(),
            b.encode(KeyFormat::Full).as_bytes()
        );
    }

    #[test]
    fn test_secret_key_reproduces_public_key() {
        let keypair = KeyPair::derive(&[9u8; SEED_LEN]).unwrap();
        let restored = SecretKey::from_bytes(&keypair.secret_key_bytes()).unwrap();
        assert_eq!(
            restored.sk_to_pk().serialize(),
            keypair.public_key().serialize()
        );
        assert_eq!(keypair.secret_key_hex().len(), 64);
    }

    #[test]
    fn test_debug_hides_secret() {
        let keypair = KeyPair::derive(&[3u8; SEED_LEN]).unwrap();
        let debug = format!("{:?}", keypair);
        assert!(!debug.contains(&keypair.secret_key_hex()));
    }
}
