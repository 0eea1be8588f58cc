use std::sync::Arc;

use auth::Claims;
use auth::RoleFamily;
use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::ports::AccountRepository;

/// Binds verified token claims to the account they name.
///
/// A signature only proves who the server once said the holder was; the
/// account row decides whether that is still true.
pub struct IdentityBinder<AR>
where
    AR: AccountRepository,
{
    repository: Arc<AR>,
}

impl<AR> IdentityBinder<AR>
where
    AR: AccountRepository,
{
    pub fn new(repository: Arc<AR>) -> Self {
        Self { repository }
    }

    /// Resolve claims to a live, eligible account.
    ///
    /// # Arguments
    /// * `claims` - Claims of a verified token
    /// * `expected` - Required role family, `None` accepts any
    ///
    /// # Errors
    /// * `Unauthenticated` - Subject is not an account id, or the account is gone or withdrawn
    /// * `Forbidden` - Family mismatch, stored role changed, or eligibility lapsed
    /// * `DatabaseError` - Lookup failed
    pub async fn bind(
        &self,
        claims: &Claims,
        expected: Option<RoleFamily>,
    ) -> Result<Account, AccountError> {
        let id = AccountId::from_string(&claims.sub).map_err(|e| {
            tracing::warn!(subject = %claims.sub, error = %e, "Token subject is not an account id");
            AccountError::Unauthenticated
        })?;

        if let Some(expected) = expected {
            if claims.role != expected {
                tracing::warn!(
                    account_id = %id,
                    token_role = %claims.role,
                    expected = %expected,
                    "Token role family rejected"
                );
                return Err(AccountError::Forbidden(format!(
                    "requires the {} role",
                    expected
                )));
            }
        }

        let account = self.repository.find_by_id(&id).await?.ok_or_else(|| {
            tracing::warn!(account_id = %id, "Token names an unknown account");
            AccountError::Unauthenticated
        })?;

        let Some(family) = account.role.family() else {
            tracing::warn!(account_id = %id, "Token names a withdrawn account");
            return Err(AccountError::Unauthenticated);
        };

        if family != claims.role {
            tracing::warn!(
                account_id = %id,
                token_role = %claims.role,
                stored_role = %account.role,
                "Stored role no longer matches token"
            );
            return Err(AccountError::Forbidden(
                "account role has changed".to_string(),
            ));
        }

        ensure_eligible(&account, Utc::now())?;

        Ok(account)
    }
}

/// Role-specific conditions an active account must still meet.
///
/// # Errors
/// * `Forbidden` - Hospital administrator without a live contract
pub fn ensure_eligible(account: &Account, now: DateTime<Utc>) -> Result<(), AccountError> {
    if account.role.family() == Some(RoleFamily::HospitalAdmin) {
        let active = account
            .hospital
            .as_ref()
            .is_some_and(|hospital| hospital.is_contract_active(now));

        if !active {
            tracing::warn!(account_id = %account.id, "Hospital contract is not active");
            return Err(AccountError::Forbidden(
                "hospital contract is not active".to_string(),
            ));
        }
    }

    Ok(())
}
