//! Shared test fixtures and helper utilities.
//!
//! Provides pre-built JWT tokens with known claims and a helper for
//! writing temporary wordlists.
#![allow(dead_code)]

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tempfile::NamedTempFile;

/// An HS256-signed JWT for testing.
///
/// Header: `{"alg":"HS256","typ":"JWT"}`
/// Payload: `{"sub":"1234567890","name":"John Doe","iat":1516239022}`
/// Secret: `"your-256-bit-secret"`
pub const VALID_HS256_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
     eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.\
     SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

/// Secret that signed [`VALID_HS256_TOKEN`].
pub const VALID_HS256_SECRET: &str = "your-256-bit-secret";

/// A malformed token with only two parts (missing signature).
pub const MALFORMED_TOKEN_TWO_PARTS: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0";

/// A completely invalid token string.
pub const INVALID_TOKEN: &str = "not-a-valid-jwt";

/// An unsigned token: `{"alg":"none"}` / `{"role":"Root"}`.
pub const ALG_NONE_TOKEN: &str = "eyJhbGciOiJub25lIn0.eyJyb2xlIjoiUm9vdCJ9.";

/// Create an HS256-signed token with the given claims.
pub fn create_hs256_token(secret: &str, claims: &serde_json::Value) -> String {
    create_hmac_token(jsonwebtoken::Algorithm::HS256, secret, claims)
}

/// Create an HMAC-signed token with the given algorithm and claims.
pub fn create_hmac_token(
    algorithm: jsonwebtoken::Algorithm,
    secret: &str,
    claims: &serde_json::Value,
) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};
    let header = Header::new(algorithm);
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&header, claims, &key).unwrap()
}

/// Build an RS256-labelled token with an opaque signature.
///
/// The signature is never checked: asymmetric tokens are only analyzed.
pub fn create_rs256_like_token(claims: &serde_json::Value) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode([7u8; 256]),
    )
}

/// Write the given lines to a temporary wordlist file.
pub fn wordlist(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

/// Claims that raise no findings: short expiry, no privileged claims.
pub fn clean_claims() -> serde_json::Value {
    let exp = chrono::Utc::now().timestamp() + 600;
    serde_json::json!({
        "sub": "1234567890",
        "name": "Test User",
        "exp": exp
    })
}
