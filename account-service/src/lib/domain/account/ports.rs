use async_trait::async_trait;
use auth::Claims;
use auth::RoleFamily;

use crate::account::eraser::ErasureReport;
use crate::account::errors::AccountError;
use crate::account::errors::StorageError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountUpdate;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::LoginOutcome;
use crate::account::models::RegisterAccountCommand;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new patient account.
    ///
    /// # Arguments
    /// * `command` - Validated command containing email, name and password
    ///
    /// # Returns
    /// Created account entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterAccountCommand) -> Result<Account, AccountError>;

    /// Check a password and issue a session token.
    ///
    /// A matched legacy digest is replaced by a modern one before returning.
    ///
    /// # Arguments
    /// * `command` - Raw identifier, password and optional portal family
    ///
    /// # Returns
    /// Account with a freshly signed token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier, wrong password or retired account
    /// * `Forbidden` - Credentials valid but the account is not eligible to sign in
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AccountError>;

    /// Load the live account behind verified claims.
    ///
    /// # Arguments
    /// * `claims` - Claims of a verified token
    /// * `expected` - Role family the caller requires, or `None` for any
    ///
    /// # Returns
    /// Current account entity
    ///
    /// # Errors
    /// * `Unauthenticated` - Account missing or withdrawn
    /// * `Forbidden` - Wrong role family or lapsed eligibility
    /// * `DatabaseError` - Database operation failed
    async fn bind(
        &self,
        claims: &Claims,
        expected: Option<RoleFamily>,
    ) -> Result<Account, AccountError>;

    /// Erase an account after the holder typed the confirmation phrase.
    ///
    /// # Arguments
    /// * `id` - Account to erase
    /// * `confirmation_phrase` - Phrase supplied by the caller
    ///
    /// # Returns
    /// Per-step report; cleanup failures are recorded, not raised
    ///
    /// # Errors
    /// * `Validation` - Phrase missing or wrong
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Anonymizing the account failed
    async fn erase(
        &self,
        id: &AccountId,
        confirmation_phrase: Option<&str>,
    ) -> Result<ErasureReport, AccountError>;
}

/// Persistence operations for account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist new account to storage.
    ///
    /// # Arguments
    /// * `account` - Account entity to create
    ///
    /// # Returns
    /// Created account entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, account: Account) -> Result<Account, AccountError>;

    /// Retrieve account by identifier.
    ///
    /// # Arguments
    /// * `id` - Account ID
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by login identifier.
    ///
    /// # Arguments
    /// * `email` - Email address used to sign in
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_identifier(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountError>;

    /// Write the set fields of `update` to an account.
    ///
    /// # Arguments
    /// * `id` - Account ID to update
    /// * `update` - Fields to change
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_fields(&self, id: &AccountId, update: AccountUpdate)
        -> Result<(), AccountError>;
}

/// Trainer subscriptions held by patients.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync + 'static {
    /// Deactivate every active subscription of an account.
    ///
    /// # Returns
    /// Number of subscriptions changed
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn deactivate_for_account(&self, id: &AccountId) -> Result<u64, AccountError>;
}

/// Blob storage for uploaded media.
#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    /// List the keys of every object owned by an account.
    ///
    /// # Errors
    /// * `Io` - Listing failed
    async fn list_owned_objects(&self, id: &AccountId) -> Result<Vec<String>, StorageError>;

    /// Delete objects by key. Keys that no longer exist are skipped.
    ///
    /// # Errors
    /// * `InvalidPath` - A key escapes the store
    /// * `Io` - Deletion failed
    async fn delete_objects(&self, keys: &[String]) -> Result<(), StorageError>;
}

/// Metadata rows describing uploaded media.
#[async_trait]
pub trait MediaRecordRepository: Send + Sync + 'static {
    /// # Returns
    /// Number of records removed
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete_by_account(&self, id: &AccountId) -> Result<u64, AccountError>;
}

/// Direct messages between accounts.
#[async_trait]
pub trait MessageRepository: Send + Sync + 'static {
    /// Delete messages the account sent or received.
    ///
    /// # Returns
    /// Number of messages removed
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete_involving(&self, id: &AccountId) -> Result<u64, AccountError>;
}
