/// Stored password digest, classified by its own prefix.
///
/// A digest is either in the modern scheme (Argon2 PHC string) or in the
/// legacy scheme (unsalted SHA-256, lowercase hex). The scheme is never stored
/// separately: it is read off the digest shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digest<'a> {
    /// Argon2 PHC string, e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`
    Modern(&'a str),

    /// 64 lowercase hex characters
    Legacy(&'a str),
}

impl<'a> Digest<'a> {
    pub const MODERN_PREFIX: &'static str = "$argon2";
    const LEGACY_LEN: usize = 64;

    /// Classify a stored digest.
    ///
    /// # Returns
    /// `None` for empty or unrecognized digests
    pub fn parse(raw: &'a str) -> Option<Self> {
        if raw.starts_with(Self::MODERN_PREFIX) {
            Some(Digest::Modern(raw))
        } else if raw.len() == Self::LEGACY_LEN
            && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            Some(Digest::Legacy(raw))
        } else {
            None
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Digest::Legacy(_))
    }

    pub fn as_str(&self) -> &'a str {
        match self {
            Digest::Modern(s) | Digest::Legacy(s) => s,
        }
    }
}
