use http::HeaderMap;

use crate::credential::CredentialResolver;
use crate::credential::ResolvedCredential;
use crate::credential::Unauthenticated;
use crate::jwt::Claims;
use crate::jwt::InvalidToken;
use crate::jwt::JwtHandler;
use crate::jwt::LegacyTokenCodec;
use crate::jwt::RoleFamily;
use crate::jwt::TokenError;
use crate::jwt::TokenLifetimes;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token handling.
///
/// Built once at startup from the signing secrets and shared read-only for the
/// lifetime of the process.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    legacy_codec: Option<LegacyTokenCodec>,
    lifetimes: TokenLifetimes,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,

    /// Replacement digest when the stored one was in the legacy scheme
    pub migrated_digest: Option<String>,
}

/// Outcome of checking a password against a stored digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCheck {
    pub matched: bool,

    /// Modern-scheme digest to store in place of a matched legacy one
    pub new_digest: Option<String>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for signing current-format tokens
    ///
    /// Legacy cookies are rejected until [`Authenticator::with_legacy_secret`]
    /// is called.
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
            legacy_codec: None,
            lifetimes: TokenLifetimes::default(),
        }
    }

    /// Accept legacy session cookies signed with `secret`.
    pub fn with_legacy_secret(mut self, secret: &[u8]) -> Self {
        self.legacy_codec = Some(LegacyTokenCodec::new(secret));
        self
    }

    pub fn with_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }

    pub fn lifetimes(&self) -> &TokenLifetimes {
        &self.lifetimes
    }

    pub fn legacy_codec(&self) -> Option<&LegacyTokenCodec> {
        self.legacy_codec.as_ref()
    }

    /// Claims for a freshly authenticated account, expiring after the
    /// family's configured lifetime.
    pub fn claims_for(&self, subject: impl ToString, role: RoleFamily) -> Claims {
        Claims::for_subject(subject, role, self.lifetimes.for_family(role))
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password and, on a legacy match, produce its modern digest.
    ///
    /// Storing `new_digest` is the caller's job. No new digest is produced for
    /// a failed match or an already-modern digest.
    ///
    /// # Errors
    /// * `PasswordError` - Re-hashing a matched legacy password failed
    pub fn verify_and_maybe_migrate_password(
        &self,
        password: &str,
        stored_digest: &str,
    ) -> Result<PasswordCheck, PasswordError> {
        if !self.password_hasher.verify(password, stored_digest) {
            return Ok(PasswordCheck {
                matched: false,
                new_digest: None,
            });
        }

        let new_digest = if self.password_hasher.needs_migration(stored_digest) {
            Some(self.password_hasher.hash(password)?)
        } else {
            None
        };

        Ok(PasswordCheck {
            matched: true,
            new_digest,
        })
    }

    /// Spend a password verification's worth of work and reject.
    ///
    /// For login attempts with no account or no digest to check, so they
    /// take as long as a wrong password.
    pub fn reject_password(&self, password: &str) {
        let matched = self.password_hasher.verify_placeholder(password);
        debug_assert!(!matched);
    }

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Re-hashing a legacy digest failed
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_digest: &str,
        claims: &Claims,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let check = self.verify_and_maybe_migrate_password(password, stored_digest)?;

        if !check.matched {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.issue(claims)?;

        Ok(AuthenticationResult {
            access_token,
            migrated_digest: check.new_digest,
        })
    }

    /// Issue a token without password verification.
    ///
    /// For flows where identity was established by other means.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn issue_token(&self, claims: &Claims) -> Result<String, TokenError> {
        self.jwt_handler.issue(claims)
    }

    /// Validate a current-format token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.jwt_handler.verify(token)
    }

    /// Resolve the credential carried by request headers.
    pub fn resolve_credential(
        &self,
        headers: &HeaderMap,
    ) -> Result<ResolvedCredential, Unauthenticated> {
        CredentialResolver::new(&self.jwt_handler, self.legacy_codec.as_ref()).resolve(headers)
    }
}
