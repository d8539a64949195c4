//! CLI argument definitions for jwt-audit.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Each subcommand has its own argument struct for type-safe parsing.
//!
//! # Security
//!
//! `DecodeArgs` and `AuditArgs` implement custom `Debug` to redact the
//! token and prevent accidental leakage through debug formatting, error
//! chains, or logging.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Wordlist used when neither `--wordlist` nor the env var is given.
pub const DEFAULT_WORDLIST: &str = "scraped-JWT-secrets.txt";

/// An offline security auditor for JSON Web Tokens (JWTs): flags weak
/// algorithms, risky claims and expiry problems, and tries to recover
/// HMAC signing secrets from a wordlist.
#[derive(Debug, Parser)]
#[command(name = "jwt-audit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Audit a JWT for weaknesses and try to recover its HMAC secret.
    Audit(AuditArgs),

    /// Decode and inspect a JWT without auditing it.
    Decode(DecodeArgs),
}

/// Where to read the token from.
#[derive(clap::Args)]
pub struct TokenInput {
    /// The JWT to process. If omitted, reads from stdin.
    pub token: Option<String>,

    /// Read the token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME")]
    pub token_env: Option<String>,
}

/// Custom `Debug` that redacts the token field to prevent accidental leakage.
impl fmt::Debug for TokenInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenInput")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .finish()
    }
}

/// Arguments for the `decode` subcommand.
#[derive(Debug, clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: TokenInput,

    /// Output raw JSON (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `audit` subcommand.
#[derive(Debug, clap::Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub input: TokenInput,

    /// Newline-delimited list of candidate HMAC secrets.
    #[arg(
        long,
        value_name = "FILE",
        env = "JWT_AUDIT_WORDLIST",
        default_value = DEFAULT_WORDLIST
    )]
    pub wordlist: PathBuf,

    /// Skip the dictionary attack on HMAC secrets.
    #[arg(long)]
    pub no_brute_force: bool,

    /// Worker threads for the dictionary attack.
    ///
    /// With more than one thread the reported secret is a match, not
    /// necessarily the first one in the wordlist.
    #[arg(long, value_name = "N", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: u16,

    /// Give up on the dictionary attack after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Evaluate expiry rules at a simulated time.
    ///
    /// Accepts relative expressions like "+7d", "-1h", "+30m" or
    /// absolute timestamps in RFC 3339 or Unix epoch format.
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    pub at: Option<String>,

    /// Output raw JSON (machine-readable).
    #[arg(long)]
    pub json: bool,
}
