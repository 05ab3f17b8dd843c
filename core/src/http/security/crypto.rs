//! Password hashing and verification.
//!
//! # Hash scheme
//! The first round digests `salt || secret`, every further round digests the
//! previous output. The stored form is the lowercase hex of the final
//! digest. Comparison is constant time.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;

use crate::http::error::ConfigurationError;

/// Iteration count of the reference login policy.
pub const DEFAULT_ITERATIONS: u32 = 1024;

/// Trait for encoding and verifying passwords.
///
/// # Example
/// ```
/// use auth_gateway_core::http::security::crypto::{CredentialVerifier, PasswordEncoder};
///
/// let verifier = CredentialVerifier::default();
/// let hash = verifier.encode("my_password");
/// assert!(verifier.matches("my_password", &hash));
/// ```
pub trait PasswordEncoder: Send + Sync {
    /// Encode the raw password.
    fn encode(&self, raw_password: &str) -> String;

    /// Verify a raw password against an encoded password.
    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool;
}

/// Digest used by a [`CredentialVerifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Canonical algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Digest length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
        }
    }

    fn iterate(&self, salt: &[u8], secret: &[u8], iterations: u32) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => iterate::<Sha256>(salt, secret, iterations),
            HashAlgorithm::Sha512 => iterate::<Sha512>(salt, secret, iterations),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('_', "-").as_str() {
            "SHA-256" | "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA-512" | "SHA512" => Ok(HashAlgorithm::Sha512),
            other => Err(format!("unsupported hash algorithm: {}", other)),
        }
    }
}

fn iterate<D: Digest>(salt: &[u8], secret: &[u8], iterations: u32) -> Vec<u8> {
    let mut hasher = D::new();
    hasher.update(salt);
    hasher.update(secret);
    let mut hashed = hasher.finalize();

    for _ in 1..iterations {
        hashed = D::digest(&hashed);
    }
    hashed.to_vec()
}

/// Iterated-hash credential verifier.
///
/// The algorithm and iteration count are fixed at construction; a verifier is
/// shared read-only by every request.
///
/// # Example
/// ```
/// use auth_gateway_core::http::security::crypto::{CredentialVerifier, HashAlgorithm};
///
/// let verifier = CredentialVerifier::new(HashAlgorithm::Sha256, 1024).unwrap();
/// let stored = verifier.hash("secret_password");
///
/// assert!(verifier.verify(&stored, "secret_password"));
/// assert!(!verifier.verify(&stored, "wrong_password"));
/// assert!(!verifier.verify("not-hex", "secret_password"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialVerifier {
    algorithm: HashAlgorithm,
    iterations: u32,
}

impl CredentialVerifier {
    /// Creates a verifier. Zero iterations is a configuration error.
    pub fn new(algorithm: HashAlgorithm, iterations: u32) -> Result<Self, ConfigurationError> {
        if iterations == 0 {
            return Err(ConfigurationError::InvalidIterations);
        }
        Ok(Self {
            algorithm,
            iterations,
        })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hashes `secret` without salt and returns the hex digest.
    pub fn hash(&self, secret: &str) -> String {
        self.hash_salted(secret, &[])
    }

    /// Hashes `secret` with `salt` and returns the hex digest.
    pub fn hash_salted(&self, secret: &str, salt: &[u8]) -> String {
        hex::encode(self.algorithm.iterate(salt, secret.as_bytes(), self.iterations))
    }

    /// Checks `candidate` against an unsalted stored hash.
    ///
    /// Returns `false` for malformed stored hashes instead of failing.
    pub fn verify(&self, stored_hash: &str, candidate: &str) -> bool {
        self.verify_salted(stored_hash, candidate, &[])
    }

    /// Checks `candidate` against a stored hash produced with `salt`.
    pub fn verify_salted(&self, stored_hash: &str, candidate: &str, salt: &[u8]) -> bool {
        let Ok(expected) = hex::decode(stored_hash.trim()) else {
            return false;
        };
        if expected.len() != self.algorithm.output_len() {
            return false;
        }

        let actual = self
            .algorithm
            .iterate(salt, candidate.as_bytes(), self.iterations);
        bool::from(actual.as_slice().ct_eq(expected.as_slice()))
    }
}

impl Default for CredentialVerifier {
    /// SHA-256 with [`DEFAULT_ITERATIONS`] rounds.
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl PasswordEncoder for CredentialVerifier {
    fn encode(&self, raw_password: &str) -> String {
        self.hash(raw_password)
    }

    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool {
        self.verify(encoded_password, raw_password)
    }
}
