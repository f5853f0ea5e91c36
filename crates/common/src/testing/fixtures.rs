//! JWT-shaped fixtures
//!
//! The session layer never checks signatures, so fixtures carry a fixed
//! placeholder signature segment.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
const SIGNATURE: &str = "c2lnbmF0dXJl";

/// Build `header.payload.signature` from a JSON payload.
pub fn unsigned_jwt(claims: &Value) -> String {
    token_with_payload(&claims.to_string())
}

/// Build a token whose payload segment encodes `payload` verbatim, which
/// lets tests produce payloads that are not valid JSON.
pub fn token_with_payload(payload: &str) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(HEADER),
        URL_SAFE_NO_PAD.encode(payload),
        SIGNATURE
    )
}

/// Token whose `exp` claim is `exp_unix_seconds`.
pub fn token_expiring_at(exp_unix_seconds: u64) -> String {
    unsigned_jwt(&json!({ "sub": "user-1", "exp": exp_unix_seconds }))
}
