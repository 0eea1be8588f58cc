use std::env;
use std::path::PathBuf;
use std::time::Duration;

use auth::Authenticator;
use auth::TokenLifetimes;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::account::eraser::StepPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub erasure: ErasureConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    pub secret: String,
    /// Enables legacy session cookies when set
    #[serde(default)]
    pub legacy_secret: Option<String>,
    #[serde(default = "default_token_lifetime_days")]
    pub token_lifetime_days: i64,
    #[serde(default)]
    pub hospital_admin_lifetime_days: Option<i64>,
    #[serde(default)]
    pub trainer_lifetime_days: Option<i64>,
    #[serde(default)]
    pub cookie_secure: bool,
}

// Secrets stay out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("legacy_enabled", &self.legacy_secret.is_some())
            .field("token_lifetime_days", &self.token_lifetime_days)
            .field("hospital_admin_lifetime_days", &self.hospital_admin_lifetime_days)
            .field("trainer_lifetime_days", &self.trainer_lifetime_days)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

fn default_token_lifetime_days() -> i64 {
    TokenLifetimes::DEFAULT_DAYS
}

impl AuthConfig {
    pub fn lifetimes(&self) -> TokenLifetimes {
        let days = chrono::Duration::days;
        TokenLifetimes {
            patient: days(self.token_lifetime_days),
            hospital_admin: days(
                self.hospital_admin_lifetime_days
                    .unwrap_or(self.token_lifetime_days),
            ),
            trainer: days(self.trainer_lifetime_days.unwrap_or(self.token_lifetime_days)),
        }
    }

    /// Build the process-wide authenticator from this section.
    pub fn authenticator(&self) -> Authenticator {
        let authenticator =
            Authenticator::new(self.secret.as_bytes()).with_lifetimes(self.lifetimes());

        match &self.legacy_secret {
            Some(legacy_secret) => authenticator.with_legacy_secret(legacy_secret.as_bytes()),
            None => authenticator,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub media_root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ErasureConfig {
    pub confirmation_phrase: String,
    #[serde(default = "default_step_timeout_ms")]
    pub step_timeout_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_step_timeout_ms() -> u64 {
    5_000
}

fn default_max_attempts() -> u32 {
    3
}

impl ErasureConfig {
    pub fn step_policy(&self) -> StepPolicy {
        StepPolicy {
            timeout: Duration::from_millis(self.step_timeout_ms),
            max_attempts: self.max_attempts.max(1),
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, AUTH__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: AUTH__LEGACY_SECRET=... sets auth.legacy_secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}
