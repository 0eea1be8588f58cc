use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for AccountRole parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown account role: {0}")]
pub struct AccountRoleError(pub String);

/// Error for object storage operations
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Object path rejected: {0}")]
    InvalidPath(String),

    #[error("Object storage I/O failed: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// Top-level error for all account-related operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid account ID: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Validation failed: {0}")]
    Validation(String),

    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired session")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Domain-level errors
    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Dependency timed out: {0}")]
    Timeout(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AccountError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AccountError::DatabaseError(_)
                | AccountError::Storage(StorageError::Io(_))
                | AccountError::Timeout(_)
        )
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        AccountError::Unknown(err.to_string())
    }
}

impl From<AccountRoleError> for AccountError {
    fn from(err: AccountRoleError) -> Self {
        AccountError::DatabaseError(err.to_string())
    }
}
