use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

/// Category of principal a token represents.
///
/// Serialized into the `role` claim; binder paths accept only the families
/// they are declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleFamily {
    Patient,
    HospitalAdmin,
    Trainer,
}

impl RoleFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleFamily::Patient => "patient",
            RoleFamily::HospitalAdmin => "hospital-admin",
            RoleFamily::Trainer => "trainer",
        }
    }

    /// Map the `user_type` tag carried by legacy session cookies.
    pub fn from_legacy_tag(tag: &str) -> Option<Self> {
        match tag {
            "user" => Some(RoleFamily::Patient),
            "hospital" => Some(RoleFamily::HospitalAdmin),
            "trainer" => Some(RoleFamily::Trainer),
            _ => None,
        }
    }

    pub fn legacy_tag(&self) -> &'static str {
        match self {
            RoleFamily::Patient => "user",
            RoleFamily::HospitalAdmin => "hospital",
            RoleFamily::Trainer => "trainer",
        }
    }
}

impl fmt::Display for RoleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role family: {0}")]
pub struct UnknownRoleFamily(pub String);

impl FromStr for RoleFamily {
    type Err = UnknownRoleFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(RoleFamily::Patient),
            "hospital-admin" => Ok(RoleFamily::HospitalAdmin),
            "trainer" => Ok(RoleFamily::Trainer),
            other => Err(UnknownRoleFamily(other.to_string())),
        }
    }
}

/// Token lifetime per role family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub patient: Duration,
    pub hospital_admin: Duration,
    pub trainer: Duration,
}

impl TokenLifetimes {
    pub const DEFAULT_DAYS: i64 = 30;

    /// Same lifetime for every family.
    pub fn uniform(lifetime: Duration) -> Self {
        Self {
            patient: lifetime,
            hospital_admin: lifetime,
            trainer: lifetime,
        }
    }

    pub fn for_family(&self, family: RoleFamily) -> Duration {
        match family {
            RoleFamily::Patient => self.patient,
            RoleFamily::HospitalAdmin => self.hospital_admin,
            RoleFamily::Trainer => self.trainer,
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self::uniform(Duration::days(Self::DEFAULT_DAYS))
    }
}
