pub mod claims;
pub mod errors;
pub mod handler;
pub mod legacy;
pub mod role;
pub mod token;

pub use claims::Claims;
pub use errors::InvalidToken;
pub use errors::TokenError;
pub use handler::JwtHandler;
pub use legacy::LegacyTokenCodec;
pub use role::RoleFamily;
pub use role::TokenLifetimes;
pub use token::SessionToken;
