//! Credential verifier tests.
//!
//! Reference digests for SHA-256 with 1024 rounds.

use auth_gateway_core::http::security::{CredentialVerifier, HashAlgorithm, PasswordEncoder};

#[actix_web::test]
async fn test_default_policy_reference_digest() {
    let verifier = CredentialVerifier::default();
    assert_eq!(verifier.algorithm(), HashAlgorithm::Sha256);
    assert_eq!(verifier.iterations(), 1024);

    let stored = "308787fa941081e9305ba5374fa79cc8ea5480cc962ad77fe1336289c0e53caa";
    assert_eq!(verifier.hash("admin"), stored);
    assert!(verifier.verify(stored, "admin"));
    assert!(!verifier.verify(stored, "Admin"));
}

#[actix_web::test]
async fn test_salted_reference_digest() {
    let verifier = CredentialVerifier::default();
    let stored = "7c380011ee16682341f281e61e16b1cc453b3a80e5145282e5da129c0830b462";
    assert_eq!(verifier.hash_salted("s3cret", b"salt"), stored);
    assert!(verifier.verify_salted(stored, "s3cret", b"salt"));
}

#[actix_web::test]
async fn test_two_rounds() {
    let verifier = CredentialVerifier::new(HashAlgorithm::Sha256, 2).unwrap();
    assert_eq!(
        verifier.hash("abc"),
        "4f8b42c22dd3729b519ba6f68d2da7cc5b2d606d05daed5ad5128cc03e6c6358"
    );
}

#[actix_web::test]
async fn test_uppercase_stored_hash_accepted() {
    let verifier = CredentialVerifier::default();
    let stored = verifier.hash("admin").to_uppercase();
    assert!(verifier.verify(&stored, "admin"));
}

#[actix_web::test]
async fn test_password_encoder_trait() {
    let encoder: Box<dyn PasswordEncoder> = Box::new(CredentialVerifier::default());
    let hash = encoder.encode("test_password_123");

    assert_ne!(hash, "test_password_123");
    assert!(encoder.matches("test_password_123", &hash));
    assert!(!encoder.matches("wrong_password", &hash));
}
