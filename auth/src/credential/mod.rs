pub mod carrier;
pub mod cookies;
pub mod resolver;

pub use carrier::Carrier;
pub use carrier::LEGACY_COOKIE;
pub use carrier::PRIMARY_COOKIE;
pub use cookies::clear_session_cookies;
pub use cookies::session_cookie;
pub use resolver::CredentialResolver;
pub use resolver::ResolvedCredential;
pub use resolver::Unauthenticated;
