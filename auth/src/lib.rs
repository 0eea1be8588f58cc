//! Stateless credential library
//!
//! Provides the signed-credential building blocks shared by services:
//! - Password hashing (Argon2id) with verification of legacy SHA-256 digests
//! - Session token issuance and verification (HS256 JWT, plus the legacy
//!   cookie envelope)
//! - Credential resolution across bearer header, primary and legacy cookies
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.needs_migration(&hash));
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{Claims, JwtHandler, RoleFamily};
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::for_subject("user123", RoleFamily::Patient, Duration::days(30));
//! let token = handler.issue(&claims).unwrap();
//! let decoded = handler.verify(&token).unwrap();
//! assert_eq!(decoded.sub, "user123");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, RoleFamily};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let claims = auth.claims_for("user123", RoleFamily::Patient);
//! let result = auth.authenticate("password123", &hash, &claims).unwrap();
//!
//! // Validate token
//! let decoded = auth.verify_token(&result.access_token).unwrap();
//! assert_eq!(decoded.role, RoleFamily::Patient);
//! ```

pub mod authenticator;
pub mod credential;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::PasswordCheck;
pub use credential::Carrier;
pub use credential::ResolvedCredential;
pub use credential::Unauthenticated;
pub use jwt::Claims;
pub use jwt::InvalidToken;
pub use jwt::JwtHandler;
pub use jwt::LegacyTokenCodec;
pub use jwt::RoleFamily;
pub use jwt::TokenError;
pub use jwt::TokenLifetimes;
pub use password::PasswordError;
pub use password::PasswordHasher;
