//! Command handlers for each CLI subcommand.
//!
//! Each subcommand is implemented in its own module and exposes
//! a single `execute` function that receives the parsed arguments.

pub mod audit;
pub mod decode;

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use jwt_audit::error::JwtAuditError;

use crate::cli::TokenInput;

/// Upper bound on a token read from stdin (1 MB).
const MAX_STDIN_TOKEN_SIZE: u64 = 1_048_576;

/// Resolve the token from the argument, an environment variable, or stdin.
///
/// Surrounding whitespace is trimmed. An empty result is treated as no
/// token at all.
pub fn resolve_token(input: &TokenInput) -> Result<Zeroizing<String>, JwtAuditError> {
    let raw = if let Some(token) = &input.token {
        Zeroizing::new(token.clone())
    } else if let Some(name) = &input.token_env {
        read_env_token(name)?
    } else {
        read_stdin_token()?
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(JwtAuditError::NoTokenProvided);
    }
    Ok(Zeroizing::new(trimmed.to_string()))
}

fn read_env_token(name: &str) -> Result<Zeroizing<String>, JwtAuditError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(JwtAuditError::InvalidEnvVarName {
            name: name.to_string(),
        });
    }
    std::env::var(name)
        .map(Zeroizing::new)
        .map_err(|_| JwtAuditError::EnvVarNotFound {
            name: name.to_string(),
        })
}

fn read_stdin_token() -> Result<Zeroizing<String>, JwtAuditError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(JwtAuditError::NoTokenProvided);
    }
    read_bounded_token(stdin.lock(), MAX_STDIN_TOKEN_SIZE)
}

/// Read at most `limit` bytes of UTF-8. One extra byte is requested so
/// that an oversized input is rejected rather than cut short.
fn read_bounded_token<R: Read>(reader: R, limit: u64) -> Result<Zeroizing<String>, JwtAuditError> {
    let mut buf = Zeroizing::new(Vec::new());
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|source| JwtAuditError::StdinRead { source })?;

    if buf.len() as u64 > limit {
        return Err(JwtAuditError::TokenTooLarge { limit });
    }

    let text = std::str::from_utf8(&buf).map_err(|e| JwtAuditError::StdinRead {
        source: io::Error::new(io::ErrorKind::InvalidData, e),
    })?;
    Ok(Zeroizing::new(text.to_string()))
}
