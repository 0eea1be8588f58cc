use thiserror::Error;

/// Error type for password operations.
///
/// Verification never produces an error: an unreadable digest is reported as
/// a mismatch. Only producing a new digest can fail.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
