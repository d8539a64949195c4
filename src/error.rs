//! Domain error types for jwt-audit.
//!
//! All business-logic errors are defined here using `thiserror`.
//! These errors are converted to user-friendly messages at the CLI boundary.
//!
//! Security findings (weak algorithms, missing expiry, privileged claims)
//! are never errors. They are reported as issues on the audit result.

use std::fmt;
use std::io;

use thiserror::Error;

/// One of the three dot-separated parts of a compact token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// The first segment (JOSE header).
    Header,
    /// The second segment (claims).
    Payload,
    /// The third segment (signature bytes).
    Signature,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Segment::Header => "header",
            Segment::Payload => "payload",
            Segment::Signature => "signature",
        })
    }
}

/// Errors that can occur while auditing a token.
#[derive(Debug, Error)]
pub enum JwtAuditError {
    /// The provided token does not have the expected three-part structure.
    #[error(
        "invalid token format: expected 'header.payload.signature' structure (found {segments} segment(s))"
    )]
    InvalidTokenFormat {
        /// How many dot-separated segments were found.
        segments: usize,
    },

    /// Failed to decode a base64url-encoded token segment.
    #[error("failed to decode {segment}: invalid base64url encoding")]
    Base64Decode {
        /// Which segment failed to decode.
        segment: Segment,
    },

    /// Failed to parse decoded segment content as a JSON object.
    #[error("failed to parse {segment} as JSON: {reason}")]
    JsonParse {
        /// Which segment failed to parse.
        segment: Segment,
        /// Description of the parsing failure.
        reason: String,
    },

    /// The candidate-secret wordlist could not be opened or read.
    #[error("wordlist '{path}' is unavailable: {source}")]
    WordlistUnavailable {
        /// Path or label of the wordlist source.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Failed to parse a time-travel expression.
    #[error("invalid time expression '{expression}': {reason}")]
    InvalidTimeExpression {
        /// The time expression that failed to parse.
        expression: String,
        /// Description of the parsing failure.
        reason: String,
    },

    /// No token was provided via any input method.
    #[error("no token provided: pass a token as an argument, via --token-env, or through stdin")]
    NoTokenProvided,

    /// The token on stdin exceeds the accepted size.
    #[error("token on stdin exceeds the {limit}-byte limit")]
    TokenTooLarge {
        /// Maximum accepted size in bytes.
        limit: u64,
    },

    /// Reading the token from stdin failed, including invalid UTF-8.
    #[error("failed to read token from stdin: {source}")]
    StdinRead {
        /// The underlying I/O or encoding failure.
        #[source]
        source: io::Error,
    },

    /// The specified environment variable is not set.
    #[error("environment variable '{name}' is not set")]
    EnvVarNotFound {
        /// Name of the missing environment variable.
        name: String,
    },

    /// The environment variable name cannot be looked up safely.
    #[error("invalid environment variable name '{name}'")]
    InvalidEnvVarName {
        /// The rejected name.
        name: String,
    },
}

impl JwtAuditError {
    /// Returns the failing segment for base64 and JSON decode errors.
    pub fn failed_segment(&self) -> Option<Segment> {
        match self {
            JwtAuditError::Base64Decode { segment } | JwtAuditError::JsonParse { segment, .. } => {
                Some(*segment)
            }
            _ => None,
        }
    }

    /// Whether this error is one of the two segment decode failures.
    pub fn is_decode_error(&self) -> bool {
        self.failed_segment().is_some()
    }
}
