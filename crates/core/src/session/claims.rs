//! Best-effort JWT expiry decoding
//!
//! Only the payload's `exp` claim is read. Signatures are never checked.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

/// base64url that accepts payloads with or without `=` padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    #[error("token must have 3 segments, found {0}")]
    Segments(usize),

    #[error("token payload is not base64url: {0}")]
    Encoding(String),

    #[error("token payload is not a JSON object: {0}")]
    Payload(String),

    #[error("token payload has no numeric exp claim")]
    MissingExpiry,
}

/// Decoded `exp` claim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenExpiry {
    /// UNIX seconds, fractional values allowed.
    pub exp: f64,
}

impl TokenExpiry {
    pub fn expires_at_ms(&self) -> f64 {
        self.exp * 1_000.0
    }

    /// Milliseconds left before expiry; zero or negative once expired.
    pub fn remaining_ms(&self, now_ms: u64) -> f64 {
        self.expires_at_ms() - now_ms as f64
    }
}

/// Read the `exp` claim from a `header.payload.signature` token.
///
/// # Errors
/// Any structural problem: segment count, payload encoding, payload JSON, or
/// a missing or non-numeric `exp`.
pub fn decode_expiry(token: &str) -> Result<TokenExpiry, ClaimsError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ClaimsError::Segments(segments.len()));
    }

    let payload = URL_SAFE_LENIENT
        .decode(segments[1])
        .map_err(|err| ClaimsError::Encoding(err.to_string()))?;
    let claims: Value =
        serde_json::from_slice(&payload).map_err(|err| ClaimsError::Payload(err.to_string()))?;

    claims
        .get("exp")
        .and_then(Value::as_f64)
        .map(|exp| TokenExpiry { exp })
        .ok_or(ClaimsError::MissingExpiry)
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
    use portico_common::testing::{token_expiring_at, token_with_payload, unsigned_jwt};
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_exp_from_unpadded_payload() {
        let token = token_expiring_at(1_700_000_000);
        assert_eq!(decode_expiry(&token).unwrap().exp, 1_700_000_000.0);
    }

    #[test]
    fn accepts_padded_payload() {
        let payload = URL_SAFE.encode(r#"{"exp":12}"#);
        assert!(payload.ends_with('='));
        let token = format!("h.{payload}.s");
        assert_eq!(decode_expiry(&token).unwrap().exp, 12.0);
    }

    #[test]
    fn accepts_fractional_exp() {
        let token = unsigned_jwt(&json!({ "exp": 10.5 }));
        let expiry = decode_expiry(&token).unwrap();
        assert_eq!(expiry.expires_at_ms(), 10_500.0);
        assert_eq!(expiry.remaining_ms(10_000), 500.0);
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert_eq!(decode_expiry("only.two"), Err(ClaimsError::Segments(2)));
        assert_eq!(decode_expiry("a.b.c.d"), Err(ClaimsError::Segments(4)));
        assert_eq!(decode_expiry(""), Err(ClaimsError::Segments(1)));
    }

    #[test]
    fn rejects_bad_encoding_and_payloads() {
        assert!(matches!(decode_expiry("h.@@@.s"), Err(ClaimsError::Encoding(_))));
        assert!(matches!(decode_expiry(&token_with_payload("not json")), Err(ClaimsError::Payload(_))));

        let no_exp = unsigned_jwt(&json!({ "sub": "u" }));
        assert_eq!(decode_expiry(&no_exp), Err(ClaimsError::MissingExpiry));

        let string_exp = format!("h.{}.s", URL_SAFE_NO_PAD.encode(r#"{"exp":"soon"}"#));
        assert_eq!(decode_expiry(&string_exp), Err(ClaimsError::MissingExpiry));
    }
}
