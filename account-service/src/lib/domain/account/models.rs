use std::fmt;
use std::str::FromStr;

use auth::RoleFamily;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::AccountRoleError;
use crate::account::errors::EmailError;

/// Account aggregate entity.
///
/// One row per identity: patient, hospital administrator or trainer.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub name: String,
    pub phone: Option<String>,
    pub role: AccountRole,
    /// `None` once the account is withdrawn; login is then impossible
    pub password_digest: Option<String>,
    pub hospital: Option<HospitalAffiliation>,
    /// Trainer a patient is subscribed to
    pub trainer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type, also the login identifier.
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// Addresses are lowercased, so case variants name the same account.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.to_lowercase();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Non-identifying address written over a withdrawn account.
    ///
    /// Derived from the id so it stays unique and re-running erasure writes
    /// the same value.
    pub fn withdrawn_placeholder(id: &AccountId) -> Self {
        EmailAddress(format!("withdrawn-{}@withdrawn.invalid", id.0.simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stored role of an account.
///
/// Active roles map onto a token role family; `Withdrawn` has none and can
/// never bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    Patient,
    HospitalAdmin,
    Trainer,
    Withdrawn,
}

impl AccountRole {
    pub fn family(&self) -> Option<RoleFamily> {
        match self {
            AccountRole::Patient => Some(RoleFamily::Patient),
            AccountRole::HospitalAdmin => Some(RoleFamily::HospitalAdmin),
            AccountRole::Trainer => Some(RoleFamily::Trainer),
            AccountRole::Withdrawn => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Patient => "patient",
            AccountRole::HospitalAdmin => "hospital_admin",
            AccountRole::Trainer => "trainer",
            AccountRole::Withdrawn => "withdrawn",
        }
    }
}

impl From<RoleFamily> for AccountRole {
    fn from(family: RoleFamily) -> Self {
        match family {
            RoleFamily::Patient => AccountRole::Patient,
            RoleFamily::HospitalAdmin => AccountRole::HospitalAdmin,
            RoleFamily::Trainer => AccountRole::Trainer,
        }
    }
}

impl FromStr for AccountRole {
    type Err = AccountRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(AccountRole::Patient),
            "hospital_admin" => Ok(AccountRole::HospitalAdmin),
            "trainer" => Ok(AccountRole::Trainer),
            "withdrawn" => Ok(AccountRole::Withdrawn),
            other => Err(AccountRoleError(other.to_string())),
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hospital an administrator acts for, with the hospital's contract end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HospitalAffiliation {
    pub hospital_id: Uuid,
    /// `None` means an open-ended contract
    pub contract_ends_at: Option<DateTime<Utc>>,
}

impl HospitalAffiliation {
    pub fn is_contract_active(&self, now: DateTime<Utc>) -> bool {
        self.contract_ends_at.map_or(true, |ends_at| ends_at > now)
    }
}

/// Command to register a new patient account
#[derive(Debug)]
pub struct RegisterAccountCommand {
    pub email: EmailAddress,
    pub name: String,
    pub phone: Option<String>,
    pub password: String,
}

impl RegisterAccountCommand {
    /// # Arguments
    /// * `email` - Validated email address
    /// * `name` - Display name
    /// * `phone` - Optional phone number
    /// * `password` - Plain text password (will be hashed by service)
    pub fn new(email: EmailAddress, name: String, phone: Option<String>, password: String) -> Self {
        Self {
            email,
            name,
            phone,
            password,
        }
    }
}

/// Command to log in with an identifier and password.
///
/// The identifier is kept raw: a malformed one must fail exactly like an
/// unknown one.
#[derive(Debug)]
pub struct LoginCommand {
    pub identifier: String,
    pub password: String,
    /// Portal the login comes from, if it only serves one role family
    pub family: Option<RoleFamily>,
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    pub access_token: String,
    /// Expiry of `access_token` (Unix timestamp)
    pub expires_at: i64,
}

/// Partial update of an account row.
///
/// `None` leaves a column untouched; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub email: Option<EmailAddress>,
    pub phone: Option<Option<String>>,
    pub password_digest: Option<Option<String>>,
    pub role: Option<AccountRole>,
    pub hospital_id: Option<Option<Uuid>>,
    pub trainer_id: Option<Option<Uuid>>,
}

impl AccountUpdate {
    pub const WITHDRAWN_NAME: &'static str = "Withdrawn user";

    /// Replace the stored password digest.
    pub fn password_digest(digest: String) -> Self {
        Self {
            password_digest: Some(Some(digest)),
            ..Self::default()
        }
    }

    /// Overwrite every identifying field and retire the account.
    pub fn anonymize(id: &AccountId) -> Self {
        Self {
            name: Some(Self::WITHDRAWN_NAME.to_string()),
            email: Some(EmailAddress::withdrawn_placeholder(id)),
            phone: Some(None),
            password_digest: Some(None),
            role: Some(AccountRole::Withdrawn),
            hospital_id: Some(None),
            trainer_id: Some(None),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the update to an in-memory account.
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(email) = &self.email {
            account.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            account.phone = phone.clone();
        }
        if let Some(digest) = &self.password_digest {
            account.password_digest = digest.clone();
        }
        if let Some(role) = self.role {
            account.role = role;
        }
        if let Some(hospital_id) = self.hospital_id {
            account.hospital = hospital_id.map(|hospital_id| HospitalAffiliation {
                hospital_id,
                contract_ends_at: account
                    .hospital
                    .as_ref()
                    .filter(|h| h.hospital_id == hospital_id)
                    .and_then(|h| h.contract_ends_at),
            });
        }
        if let Some(trainer_id) = self.trainer_id {
            account.trainer_id = trainer_id;
        }
    }
}
