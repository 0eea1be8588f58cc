use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;
use auth::RoleFamily;
use chrono::Utc;

use crate::account::binder::ensure_eligible;
use crate::account::binder::IdentityBinder;
use crate::account::eraser::AccountEraser;
use crate::account::eraser::ErasureReport;
use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountRole;
use crate::account::models::AccountUpdate;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::LoginOutcome;
use crate::account::models::RegisterAccountCommand;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;

/// Domain service implementation for account operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
pub struct AccountService<AR>
where
    AR: AccountRepository,
{
    repository: Arc<AR>,
    authenticator: Arc<Authenticator>,
    binder: IdentityBinder<AR>,
    eraser: AccountEraser,
    confirmation_phrase: String,
}

impl<AR> AccountService<AR>
where
    AR: AccountRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `authenticator` - Password and token operations
    /// * `eraser` - Erasure orchestration over the dependent stores
    /// * `confirmation_phrase` - Phrase a holder must type to erase their account
    ///
    /// # Returns
    /// Configured account service instance
    pub fn new(
        repository: Arc<AR>,
        authenticator: Arc<Authenticator>,
        eraser: AccountEraser,
        confirmation_phrase: String,
    ) -> Self {
        Self {
            binder: IdentityBinder::new(repository.clone()),
            repository,
            authenticator,
            eraser,
            confirmation_phrase,
        }
    }

    async fn store_migrated_digest(&self, id: &AccountId, digest: String) {
        match self
            .repository
            .update_fields(id, AccountUpdate::password_digest(digest))
            .await
        {
            Ok(()) => tracing::info!(account_id = %id, "Password digest upgraded"),
            // The old digest still verifies; the next login retries.
            Err(e) => tracing::warn!(
                account_id = %id,
                error = %e,
                "Failed to store upgraded password digest"
            ),
        }
    }
}

#[async_trait]
impl<AR> AccountServicePort for AccountService<AR>
where
    AR: AccountRepository,
{
    async fn register(&self, command: RegisterAccountCommand) -> Result<Account, AccountError> {
        let password_digest = self
            .authenticator
            .hash_password(&command.password)
            .map_err(|e| AccountError::Password(e.to_string()))?;

        let account = Account {
            id: AccountId::new(),
            email: command.email,
            name: command.name,
            phone: command.phone,
            role: AccountRole::Patient,
            password_digest: Some(password_digest),
            hospital: None,
            trainer_id: None,
            created_at: Utc::now(),
        };

        let created = self.repository.insert(account).await?;
        tracing::info!(account_id = %created.id, "Account registered");

        Ok(created)
    }

    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AccountError> {
        let account = match EmailAddress::new(command.identifier) {
            Ok(email) => self.repository.find_by_identifier(&email).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            tracing::debug!("Login for unknown identifier");
            self.authenticator.reject_password(&command.password);
            return Err(AccountError::InvalidCredentials);
        };

        let (Some(family), Some(digest)) =
            (account.role.family(), account.password_digest.as_deref())
        else {
            tracing::debug!(account_id = %account.id, "Login for withdrawn account");
            self.authenticator.reject_password(&command.password);
            return Err(AccountError::InvalidCredentials);
        };

        if command.family.is_some_and(|portal| portal != family) {
            tracing::debug!(account_id = %account.id, "Login through another role's portal");
            return Err(AccountError::InvalidCredentials);
        }

        let claims = self.authenticator.claims_for(account.id, family);
        let result = self
            .authenticator
            .authenticate(&command.password, digest, &claims)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => AccountError::InvalidCredentials,
                AuthenticationError::PasswordError(err) => AccountError::Password(err.to_string()),
                AuthenticationError::TokenError(err) => AccountError::Unknown(err.to_string()),
            })?;

        ensure_eligible(&account, Utc::now())?;

        if let Some(digest) = result.migrated_digest {
            self.store_migrated_digest(&account.id, digest).await;
        }

        tracing::info!(account_id = %account.id, role = %family, "Login succeeded");

        Ok(LoginOutcome {
            account,
            access_token: result.access_token,
            expires_at: claims.exp,
        })
    }

    async fn bind(
        &self,
        claims: &Claims,
        expected: Option<RoleFamily>,
    ) -> Result<Account, AccountError> {
        self.binder.bind(claims, expected).await
    }

    async fn erase(
        &self,
        id: &AccountId,
        confirmation_phrase: Option<&str>,
    ) -> Result<ErasureReport, AccountError> {
        self.eraser
            .erase_confirmed(id, confirmation_phrase, &self.confirmation_phrase)
            .await
    }
}
