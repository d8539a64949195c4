//! Compact-serialization token decoding.
//!
//! Handles splitting a raw JWT string into its three parts (header,
//! payload, signature), base64url-decoding each segment with padding
//! restoration, and parsing the header and payload as JSON objects.
//! Every failure names the segment it came from.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde_json::{Map, Value};

use crate::error::{JwtAuditError, Segment};

/// A JSON object decoded from the header or payload segment.
pub type JsonObject = Map<String, Value>;

/// The three raw segments of a compact token, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParts<'a> {
    /// Raw base64url header segment.
    pub header: &'a str,
    /// Raw base64url payload segment.
    pub payload: &'a str,
    /// Raw base64url signature segment (may be empty).
    pub signature: &'a str,
    signing_input: &'a str,
}

impl<'a> TokenParts<'a> {
    /// The `header.payload` prefix that an HMAC signature covers.
    pub fn signing_input(&self) -> &'a str {
        self.signing_input
    }
}

/// The signature segment after decoding.
#[derive(Clone, PartialEq, Eq)]
pub enum Signature {
    /// The token carries no signature bytes.
    Absent,
    /// Raw signature bytes. Never empty.
    Present(Vec<u8>),
}

impl Signature {
    /// Signature bytes, or `None` when the token is unsigned.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Signature::Absent => None,
            Signature::Present(bytes) => Some(bytes),
        }
    }

    /// Lowercase hex rendering of the signature bytes.
    pub fn hex(&self) -> Option<String> {
        self.bytes()
            .map(|bytes| bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Signature::Absent)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Absent => f.write_str("Absent"),
            Signature::Present(bytes) => write!(f, "Present({} bytes)", bytes.len()),
        }
    }
}

/// The decoded parts of a JWT.
///
/// Implements a custom `Debug` that redacts `payload` and `signature`
/// to prevent accidental leakage of sensitive claim data.
#[derive(Clone)]
pub struct DecodedToken {
    /// The parsed JWT header (typically contains `alg` and `typ`).
    pub header: JsonObject,
    /// The parsed JWT payload (claims).
    pub payload: JsonObject,
    /// The decoded signature segment.
    pub signature: Signature,
}

impl DecodedToken {
    /// The header `alg` value when it is present and a string.
    pub fn alg(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }
}

/// Custom `Debug` that redacts payload and signature to prevent
/// accidental leakage through debug formatting or error chains.
impl fmt::Debug for DecodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedToken")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Split a token into exactly three dot-separated segments.
///
/// # Errors
///
/// Returns [`JwtAuditError::InvalidTokenFormat`] unless the token has
/// exactly two `.` separators.
pub fn split_token(token: &str) -> Result<TokenParts<'_>, JwtAuditError> {
    let segments = token.split('.').count();
    let mut parts = token.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature)) if segments == 3 => Ok(TokenParts {
            header,
            payload,
            signature,
            signing_input: &token[..header.len() + 1 + payload.len()],
        }),
        _ => Err(JwtAuditError::InvalidTokenFormat { segments }),
    }
}

/// Decode a raw JWT string into its constituent parts.
///
/// Splits the token on `.` separators, base64url-decodes all three
/// segments, and parses the header and payload as JSON objects.
///
/// # Errors
///
/// Returns an error if the token doesn't have exactly three parts,
/// if base64url decoding of any segment fails, or if the header or
/// payload is not a JSON object.
pub fn decode_token(token: &str) -> Result<DecodedToken, JwtAuditError> {
    let parts = split_token(token)?;

    let header = decode_json_segment(parts.header, Segment::Header)?;
    let payload = decode_json_segment(parts.payload, Segment::Payload)?;
    let signature = decode_signature(parts.signature)?;

    tracing::debug!(
        header_fields = header.len(),
        claims = payload.len(),
        signed = !signature.is_absent(),
        "decoded token segments"
    );

    Ok(DecodedToken {
        header,
        payload,
        signature,
    })
}

/// Base64url-decode a segment, restoring any stripped `=` padding first.
///
/// Returns `None` when the padded input is not valid base64url.
pub fn base64url_decode(encoded: &str) -> Option<Vec<u8>> {
    let pad = (4 - encoded.len() % 4) % 4;
    let mut padded = String::with_capacity(encoded.len() + pad);
    padded.push_str(encoded);
    padded.extend(std::iter::repeat_n('=', pad));
    URL_SAFE.decode(padded).ok()
}

/// Base64url-decode a segment and parse it as a JSON object.
pub(crate) fn decode_json_segment(
    encoded: &str,
    segment: Segment,
) -> Result<JsonObject, JwtAuditError> {
    let bytes = base64url_decode(encoded).ok_or(JwtAuditError::Base64Decode { segment })?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(JwtAuditError::JsonParse {
            segment,
            reason: "expected a JSON object".to_string(),
        }),
        Err(e) => Err(JwtAuditError::JsonParse {
            segment,
            reason: e.to_string(),
        }),
    }
}

fn decode_signature(encoded: &str) -> Result<Signature, JwtAuditError> {
    let bytes = base64url_decode(encoded).ok_or(JwtAuditError::Base64Decode {
        segment: Segment::Signature,
    })?;
    if bytes.is_empty() {
        Ok(Signature::Absent)
    } else {
        Ok(Signature::Present(bytes))
    }
}
