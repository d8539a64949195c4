//! jwt-audit: an offline auditor for JSON Web Tokens.
//!
//! Decodes a compact-serialization token, checks its header and claims
//! against a fixed set of weakness rules, and tries to recover the
//! signing secret of HMAC tokens from a wordlist.
//!
//! ```no_run
//! use jwt_audit::core::audit::{AuditOptions, audit_token};
//! use jwt_audit::core::wordlist::WordlistFile;
//!
//! # fn main() -> Result<(), jwt_audit::error::JwtAuditError> {
//! let token = std::env::var("JWT").unwrap_or_default();
//! let result = audit_token(&token, WordlistFile::new("secrets.txt"), &AuditOptions::default())?;
//! for issue in result.issues() {
//!     println!("{}", issue.description);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod core;
pub mod display;
pub mod error;

pub use crate::core::audit::{AuditOptions, AuditResult, Issue, IssueKind, Recommendation, audit_token};
pub use crate::core::recovery::{CancellationFlag, RecoveryOptions, RecoveryOutcome, SkipReason};
pub use crate::error::{JwtAuditError, Segment};
