use http::HeaderMap;
use thiserror::Error;

use super::carrier;
use super::carrier::Carrier;
use crate::jwt::errors::InvalidReason;
use crate::jwt::Claims;
use crate::jwt::InvalidToken;
use crate::jwt::JwtHandler;
use crate::jwt::LegacyTokenCodec;
use crate::jwt::SessionToken;

/// No usable credential on the request.
///
/// Covers both "nothing presented" and "presented but rejected"; the cause is
/// only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid or expired session")]
pub struct Unauthenticated;

/// Verified claims together with the carrier they arrived on.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCredential {
    pub claims: Claims,
    pub carrier: Carrier,
}

/// Resolves the credential of a request into verified claims.
///
/// Carriers are tried in priority order (bearer header, primary cookie,
/// legacy cookie) and only the first one present is verified: a rejected
/// carrier never falls through to a lower-priority one.
pub struct CredentialResolver<'a> {
    modern: &'a JwtHandler,
    legacy: Option<&'a LegacyTokenCodec>,
}

impl<'a> CredentialResolver<'a> {
    /// # Arguments
    /// * `modern` - Codec for bearer and primary cookie tokens
    /// * `legacy` - Codec for the legacy cookie; `None` rejects legacy cookies
    pub fn new(modern: &'a JwtHandler, legacy: Option<&'a LegacyTokenCodec>) -> Self {
        Self { modern, legacy }
    }

    pub fn resolve(&self, headers: &HeaderMap) -> Result<ResolvedCredential, Unauthenticated> {
        let Some(presented) = carrier::find(headers) else {
            tracing::debug!("No credential carrier present");
            return Err(Unauthenticated);
        };

        let verified = match (presented.carrier, SessionToken::classify(presented.value)) {
            (Carrier::Bearer | Carrier::PrimaryCookie, Some(SessionToken::Modern(token))) => {
                self.modern.verify(token)
            }
            (Carrier::LegacyCookie, Some(SessionToken::Legacy(token))) => match self.legacy {
                Some(codec) => codec.verify(token),
                None => {
                    tracing::warn!("Legacy session cookie presented but legacy support is off");
                    return Err(Unauthenticated);
                }
            },
            _ => Err(InvalidToken::new(InvalidReason::Malformed)),
        };

        verified
            .map(|claims| ResolvedCredential {
                claims,
                carrier: presented.carrier,
            })
            .map_err(|e| {
                tracing::warn!(
                    carrier = presented.carrier.as_str(),
                    reason = e.reason().as_str(),
                    "Credential rejected"
                );
                Unauthenticated
            })
    }
}
