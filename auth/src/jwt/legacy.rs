use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::Hmac;
use hmac::Mac;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use super::claims::Claims;
use super::errors::InvalidReason;
use super::errors::InvalidToken;
use super::errors::TokenError;
use super::role::RoleFamily;

type HmacSha256 = Hmac<Sha256>;

/// Outer shape of a legacy session cookie.
///
/// `payload` is kept as the exact JSON text that was signed, so the signature
/// is checked before the payload is parsed.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    payload: String,
    sig: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LegacyPayload {
    user_id: String,
    user_type: String,
    iat: i64,
    exp: i64,
}

/// Codec for the older session cookie format.
///
/// The cookie value is base64url (no padding) of a JSON envelope holding the
/// payload text and a hex HMAC-SHA256 over it, signed with its own secret.
#[derive(Clone)]
pub struct LegacyTokenCodec {
    secret: Vec<u8>,
}

impl LegacyTokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, hmac::digest::InvalidLength> {
        HmacSha256::new_from_slice(&self.secret)
    }

    /// Encode claims in the legacy format.
    ///
    /// Extra claims have no place in the legacy payload and are dropped.
    ///
    /// # Errors
    /// * `EncodingFailed` - Payload serialization failed
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let payload = LegacyPayload {
            user_id: claims.sub.clone(),
            user_type: claims.role.legacy_tag().to_string(),
            iat: claims.iat,
            exp: claims.exp,
        };
        let payload = serde_json::to_string(&payload)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        let mut mac = self
            .mac()
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;
        mac.update(payload.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());

        let envelope = serde_json::to_vec(&Envelope { payload, sig })
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(envelope))
    }

    /// Decode and validate a legacy token.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let malformed = || InvalidToken::new(InvalidReason::Malformed);

        let raw = URL_SAFE_NO_PAD.decode(token).map_err(|_| malformed())?;
        let envelope: Envelope = serde_json::from_slice(&raw).map_err(|_| malformed())?;
        let sig = hex::decode(&envelope.sig).map_err(|_| malformed())?;

        let mut mac = self
            .mac()
            .map_err(|_| InvalidToken::new(InvalidReason::BadSignature))?;
        mac.update(envelope.payload.as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| InvalidToken::new(InvalidReason::BadSignature))?;

        let payload: LegacyPayload =
            serde_json::from_str(&envelope.payload).map_err(|_| malformed())?;
        let role = RoleFamily::from_legacy_tag(&payload.user_type).ok_or_else(malformed)?;

        let claims = Claims {
            sub: payload.user_id,
            role,
            iat: payload.iat,
            exp: payload.exp,
            iss: None,
            extra: Default::default(),
        };

        if claims.is_expired(Utc::now().timestamp()) {
            return Err(InvalidToken::new(InvalidReason::Expired));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn claims() -> Claims {
        Claims::for_subject("legacy-7", RoleFamily::HospitalAdmin, Duration::days(1))
    }

    #[test]
    fn test_encode_and_verify() {
        let codec = LegacyTokenCodec::new(b"legacy-secret");
        let claims = claims();

        let token = codec.encode(&claims).unwrap();
        assert!(!token.contains('.'));

        let decoded = codec.verify(&token).expect("Failed to verify legacy token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = LegacyTokenCodec::new(b"legacy-secret")
            .encode(&claims())
            .unwrap();

        let err = LegacyTokenCodec::new(b"other-secret")
            .verify(&token)
            .unwrap_err();
        assert_eq!(err.reason(), InvalidReason::BadSignature);
    }

    #[test]
    fn test_verify_tampered_payload() {
        let codec = LegacyTokenCodec::new(b"legacy-secret");
        let token = codec.encode(&claims()).unwrap();

        let raw = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let mut envelope: Envelope = serde_json::from_slice(&raw).unwrap();
        envelope.payload = envelope.payload.replace("legacy-7", "legacy-8");
        let forged = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&envelope).unwrap());

        let err = codec.verify(&forged).unwrap_err();
        assert_eq!(err.reason(), InvalidReason::BadSignature);
    }

    #[test]
    fn test_verify_expired() {
        let codec = LegacyTokenCodec::new(b"legacy-secret");
        let token = codec
            .encode(&claims().with_expiration(Utc::now().timestamp() - 1))
            .unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert_eq!(err.reason(), InvalidReason::Expired);
    }

    #[test]
    fn test_verify_malformed() {
        let codec = LegacyTokenCodec::new(b"legacy-secret");

        for token in ["", "%%%", "bm90LWpzb24", "eyJwYXlsb2FkIjoiIn0"] {
            let err = codec.verify(token).unwrap_err();
            assert_eq!(err.reason(), InvalidReason::Malformed, "token {token:?}");
        }
    }
}
