use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;
use sha2::Digest as _;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::digest::Digest;
use super::errors::PasswordError;

/// Argon2id digest with the default work factor that no password matches.
const PLACEHOLDER_DIGEST: &str = "$argon2id$v=19$m=19456,t=2,p=1$cGxhY2Vob2xkZXJzYWx0IQ$ibM4GbuB0zSzVhsFEAXgW4dhdNTOevLB/dKNwsaYBMw";

/// Password hashing across the modern and legacy schemes.
///
/// New digests are always Argon2id with a random salt and the crate's default
/// work factor. Legacy digests (unsalted SHA-256) are only ever verified.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with the modern scheme.
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored digest of either scheme.
    ///
    /// Empty, malformed or unrecognized digests never match.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match Digest::parse(digest) {
            Some(Digest::Modern(phc)) => match PasswordHash::new(phc) {
                Ok(parsed) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                Err(e) => {
                    tracing::debug!("Unreadable modern digest: {}", e);
                    false
                }
            },
            Some(Digest::Legacy(expected)) => {
                let computed = legacy_digest(password);
                computed.as_bytes().ct_eq(expected.as_bytes()).into()
            }
            None => false,
        }
    }

    /// Run a full modern verification against a digest no password matches.
    ///
    /// Login paths that have no digest to check call this so they cost the
    /// same as a wrong password.
    pub fn verify_placeholder(&self, password: &str) -> bool {
        self.verify(password, PLACEHOLDER_DIGEST)
    }

    /// Whether a stored digest should be rewritten with the modern scheme.
    pub fn needs_migration(&self, digest: &str) -> bool {
        Digest::parse(digest).is_some_and(|d| d.is_legacy())
    }
}

/// Compute a digest in the legacy scheme.
///
/// Only used to check old records and to seed fixtures; never stored for new
/// passwords.
pub fn legacy_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
