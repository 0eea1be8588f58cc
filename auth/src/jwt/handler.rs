use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::InvalidReason;
use super::errors::InvalidToken;
use super::errors::TokenError;

/// Codec for current-format session tokens.
///
/// Tokens are compact JWTs signed with HS256 (HMAC with SHA-256): base64url
/// header, claims and signature joined by dots. Signature comparison is done
/// by `jsonwebtoken` in constant time.
#[derive(Clone)]
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Rotating the secret invalidates every outstanding token
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign claims into a token, stamping `iat` with the current time.
    ///
    /// `exp` is taken as given, so a caller can issue a token that is already
    /// past its expiry.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        let mut claims = claims.clone();
        claims.iat = Utc::now().timestamp();

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a token.
    ///
    /// Malformed input, a foreign or tampered signature and an elapsed `exp`
    /// all yield the same [`InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => InvalidReason::Expired,
                ErrorKind::InvalidSignature => InvalidReason::BadSignature,
                _ => InvalidReason::Malformed,
            };
            InvalidToken::new(reason)
        })?;

        // jsonwebtoken accepts exp == now; keep the same boundary explicitly
        if token_data.claims.is_expired(Utc::now().timestamp()) {
            return Err(InvalidToken::new(InvalidReason::Expired));
        }

        Ok(token_data.claims)
    }
}
