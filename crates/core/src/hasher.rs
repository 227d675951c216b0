//! Credential hashing.
//!
//! The engine only needs two capabilities from a hasher: turn a password into a
//! digest that can be stored in the identity file, and check a password against
//! a stored digest. [`CredentialHasher`] captures exactly that so tests and
//! deployments can inject their own.
//!
//! The default [`Sha256Hasher`] writes salted digests:
//!
//! ```text
//! sha256$<32 hex salt>$<64 hex SHA-256(salt || password)>
//! ```
//!
//! and also verifies the unsalted form (a bare 64-hex SHA-256 of the password)
//! that older identity files contain.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// One-way password hashing.
pub trait CredentialHasher {
    /// Returns a digest for `plaintext`. Must not contain `|` or line breaks.
    fn hash(&self, plaintext: &str) -> String;

    /// Returns true if `plaintext` produces `digest`.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Salted SHA-256 hasher.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    pub fn new() -> Self {
        Self
    }

    fn salted(salt: &[u8], plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(plaintext.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn unsalted(plaintext: &str) -> String {
        hex::encode(Sha256::digest(plaintext.as_bytes()))
    }
}

impl CredentialHasher for Sha256Hasher {
    fn hash(&self, plaintext: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        format!(
            "{SCHEME}${}${}",
            hex::encode(salt),
            Self::salted(&salt, plaintext)
        )
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let mut parts = digest.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(SCHEME), Some(salt_hex), Some(expected)) => match hex::decode(salt_hex) {
                Ok(salt) => constant_time_eq(&Self::salted(&salt, plaintext), expected),
                Err(_) => false,
            },
            // Legacy unsalted digest
            (Some(bare), None, None) if bare.len() == 64 => {
                constant_time_eq(&Self::unsalted(plaintext), &bare.to_ascii_lowercase())
            }
            _ => false,
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = Sha256Hasher::new();
        let digest = hasher.hash("secret123");

        assert!(digest.starts_with("sha256$"));
        assert!(!digest.contains('|'));
        assert!(hasher.verify("secret123", &digest));
        assert!(!hasher.verify("wrong", &digest));
        assert!(!hasher.verify("", &digest));
    }

    #[test]
    fn test_salts_differ_between_hashes() {
        let hasher = Sha256Hasher::new();
        let a = hasher.hash("same");
        let b = hasher.hash("same");

        assert_ne!(a, b);
        assert!(hasher.verify("same", &a));
        assert!(hasher.verify("same", &b));
    }

    #[test]
    fn test_verifies_legacy_unsalted_digest() {
        let hasher = Sha256Hasher::new();
        // SHA-256("password")
        let legacy = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

        assert!(hasher.verify("password", legacy));
        assert!(hasher.verify("password", &legacy.to_uppercase()));
        assert!(!hasher.verify("Password", legacy));
    }

    #[test]
    fn test_rejects_malformed_digests() {
        let hasher = Sha256Hasher::new();
        for digest in ["", "sha256$zz$00", "md5$00$00", "abc", "sha256$"] {
            assert!(!hasher.verify("password", digest), "{digest}");
        }
    }
}
