use std::collections::BTreeMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::role::RoleFamily;

/// Claims carried by a session token.
///
/// `sub`, `role`, `iat` and `exp` are mandatory; anything else rides in
/// `extra`, kept ordered so the serialized form is stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (account identifier)
    pub sub: String,

    /// Role family the token was issued for
    pub role: RoleFamily,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Claims {
    /// Create claims for an account with automatic expiration.
    ///
    /// # Arguments
    /// * `subject` - Account identifier
    /// * `role` - Role family of the account
    /// * `lifetime` - Time until the token expires
    pub fn for_subject(subject: impl ToString, role: RoleFamily, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: None,
            extra: BTreeMap::new(),
        }
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = iat;
        self
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: String) -> Self {
        self.iss = Some(iss);
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
