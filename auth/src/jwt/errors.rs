use thiserror::Error;

/// Error type for token issuance.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}

/// Why a presented token was rejected.
///
/// Kept inside the crate: callers only ever see [`InvalidToken`], so a
/// credential holder cannot tell an expired token from a forged one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InvalidReason {
    Malformed,
    BadSignature,
    Expired,
}

impl InvalidReason {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::Malformed => "malformed",
            InvalidReason::BadSignature => "bad_signature",
            InvalidReason::Expired => "expired",
        }
    }
}

/// A presented token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Token is invalid")]
pub struct InvalidToken {
    reason: InvalidReason,
}

impl InvalidToken {
    pub(crate) fn new(reason: InvalidReason) -> Self {
        Self { reason }
    }

    pub(crate) fn reason(&self) -> InvalidReason {
        self.reason
    }
}
