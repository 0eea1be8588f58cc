pub mod digest;
pub mod errors;
pub mod hasher;

pub use digest::Digest;
pub use errors::PasswordError;
pub use hasher::legacy_digest;
pub use hasher::PasswordHasher;
