//! The audit result handed to presentation layers, and the entry point
//! that produces it.
//!
//! An [`AuditResult`] is built once per token and is read-only after
//! construction. Decode failures never produce one: they come back as a
//! [`JwtAuditError`] and no issues are reported for that token.

use chrono::{DateTime, Utc};

use crate::core::analyzer;
use crate::core::decoder::{self, DecodedToken, JsonObject, Signature};
use crate::core::recovery::{self, RecoveryOptions, RecoveryOutcome};
use crate::core::wordlist::CandidateSource;
use crate::error::JwtAuditError;

/// Category of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    UnsignedAlgorithm,
    MissingAlgorithm,
    SuspiciousAlgorithm,
    MissingExpiration,
    InvalidExpiration,
    Expired,
    LongExpiry,
    PrivilegedClaim,
    PrivilegedRole,
}

impl IssueKind {
    /// Stable snake_case identifier for machine-readable output.
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::UnsignedAlgorithm => "unsigned_algorithm",
            IssueKind::MissingAlgorithm => "missing_algorithm",
            IssueKind::SuspiciousAlgorithm => "suspicious_algorithm",
            IssueKind::MissingExpiration => "missing_expiration",
            IssueKind::InvalidExpiration => "invalid_expiration",
            IssueKind::Expired => "expired",
            IssueKind::LongExpiry => "long_expiry",
            IssueKind::PrivilegedClaim => "privileged_claim",
            IssueKind::PrivilegedRole => "privileged_role",
        }
    }
}

/// A weakness found in the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    pub description: String,
}

impl Issue {
    pub fn new(kind: IssueKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

/// Advice that goes with an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub description: String,
}

impl Recommendation {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Knobs for a single audit.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Instant used for time-based rules. Defaults to now.
    pub evaluated_at: Option<DateTime<Utc>>,
    /// Run the secret recovery engine at all.
    pub skip_recovery: bool,
    pub recovery: RecoveryOptions,
}

/// Everything learned about one token.
#[derive(Debug)]
pub struct AuditResult {
    token: DecodedToken,
    evaluated_at: DateTime<Utc>,
    issues: Vec<Issue>,
    recommendations: Vec<Recommendation>,
    recovery: RecoveryOutcome,
}

impl AuditResult {
    pub fn header(&self) -> &JsonObject {
        &self.token.header
    }

    pub fn payload(&self) -> &JsonObject {
        &self.token.payload
    }

    pub fn signature(&self) -> &Signature {
        &self.token.signature
    }

    pub fn decoded(&self) -> &DecodedToken {
        &self.token
    }

    /// The instant the time-based rules were evaluated at.
    pub fn evaluated_at(&self) -> DateTime<Utc> {
        self.evaluated_at
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn recovery(&self) -> &RecoveryOutcome {
        &self.recovery
    }

    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|issue| issue.kind == kind)
    }

    /// True when the audit found any weakness, including a recovered secret.
    pub fn has_findings(&self) -> bool {
        !self.issues.is_empty() || self.recovery.is_recovered()
    }
}

/// Decode, analyze and attempt secret recovery for one token.
///
/// # Errors
///
/// Returns [`JwtAuditError::InvalidTokenFormat`] or a segment decode
/// error when the token cannot be decoded. An unreadable wordlist is not
/// an error here: it shows up as [`RecoveryOutcome::Unavailable`].
pub fn audit_token<S: CandidateSource>(
    token: &str,
    source: S,
    options: &AuditOptions,
) -> Result<AuditResult, JwtAuditError> {
    let decoded = decoder::decode_token(token)?;
    let evaluated_at = options.evaluated_at.unwrap_or_else(Utc::now);

    let analysis = analyzer::analyze_at(&decoded.header, &decoded.payload, evaluated_at);

    let recovery = if options.skip_recovery {
        RecoveryOutcome::disabled(decoded.alg())
    } else {
        recovery::recover_secret(token, &decoded, source, &options.recovery)
    };

    tracing::info!(
        issues = analysis.issues.len(),
        recovery = recovery.label(),
        "audit complete"
    );

    Ok(AuditResult {
        token: decoded,
        evaluated_at,
        issues: analysis.issues,
        recommendations: analysis.recommendations,
        recovery,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recovery::SkipReason;
    use crate::core::signature::HmacAlgorithm;
    use crate::core::wordlist::{MemoryWordlist, WordlistFile};
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn sign_hs256(header: &str, payload: &str, secret: &str) -> String {
        let input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let tag = HmacAlgorithm::Hs256.sign(input.as_bytes(), secret.as_bytes());
        format!("{input}.{}", URL_SAFE_NO_PAD.encode(tag))
    }

    #[test]
    fn test_admin_token_recovers_secret_and_reports_privileged_claim() {
        let token = sign_hs256(r#"{"alg":"HS256"}"#, r#"{"admin":true}"#, "test123");
        let result = audit_token(
            &token,
            MemoryWordlist::from_lines(["wrong", "test123"]),
            &AuditOptions::default(),
        )
        .unwrap();

        assert!(result.has_issue(IssueKind::PrivilegedClaim));
        match result.recovery() {
            RecoveryOutcome::Recovered { secret, claims, .. } => {
                assert_eq!(secret.as_str(), "test123");
                assert_eq!(claims["admin"], true);
            }
            other => panic!("expected recovery, got {other:?}"),
        }
        assert!(result.has_findings());
    }

    #[test]
    fn test_malformed_token_produces_no_result() {
        let err = audit_token(
            "a.b",
            MemoryWordlist::from_lines(["x"]),
            &AuditOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, JwtAuditError::InvalidTokenFormat { segments: 2 }));
    }

    #[test]
    fn test_decode_error_names_segment() {
        let err = audit_token(
            "eyJhbGciOiJIUzI1NiJ9.bm90IGpzb24.",
            MemoryWordlist::from_lines(["x"]),
            &AuditOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.failed_segment(), Some(crate::error::Segment::Payload));
    }

    #[test]
    fn test_missing_wordlist_still_reports_analysis() {
        let token = sign_hs256(r#"{"alg":"HS256"}"#, r#"{"role":"root"}"#, "s3cret");
        let result = audit_token(
            &token,
            WordlistFile::new("/nonexistent/jwt-audit/wordlist.txt"),
            &AuditOptions::default(),
        )
        .unwrap();

        assert!(result.has_issue(IssueKind::PrivilegedRole));
        assert!(result.has_issue(IssueKind::MissingExpiration));
        assert!(matches!(result.recovery(), RecoveryOutcome::Unavailable { .. }));
    }

    #[test]
    fn test_skip_recovery_option() {
        let token = sign_hs256(r#"{"alg":"HS256"}"#, r#"{}"#, "s3cret");
        let options = AuditOptions {
            skip_recovery: true,
            ..AuditOptions::default()
        };
        let result = audit_token(&token, MemoryWordlist::from_lines(["s3cret"]), &options).unwrap();
        assert!(matches!(
            result.recovery(),
            RecoveryOutcome::Skipped {
                reason: SkipReason::Disabled,
                ..
            }
        ));
    }

    #[test]
    fn test_evaluated_at_drives_expiry_rules() {
        let token = sign_hs256(r#"{"alg":"HS256"}"#, r#"{"exp":1700000000}"#, "k");
        let options = AuditOptions {
            evaluated_at: DateTime::from_timestamp(1_700_000_001, 0),
            skip_recovery: true,
            ..AuditOptions::default()
        };
        let result = audit_token(&token, MemoryWordlist::from_lines(["k"]), &options).unwrap();
        assert!(result.has_issue(IssueKind::Expired));
        assert_eq!(result.evaluated_at().timestamp(), 1_700_000_001);

        let earlier = AuditOptions {
            evaluated_at: DateTime::from_timestamp(1_600_000_000, 0),
            skip_recovery: true,
            ..AuditOptions::default()
        };
        let result = audit_token(&token, MemoryWordlist::from_lines(["k"]), &earlier).unwrap();
        assert!(result.has_issue(IssueKind::LongExpiry));
        assert!(!result.has_issue(IssueKind::Expired));
    }

    #[test]
    fn test_clean_rs256_token_has_no_findings() {
        let exp = Utc::now().timestamp() + 600;
        let token = format!(
            "{}.{}.c2ln",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#),
            URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#))
        );
        let result = audit_token(
            &token,
            MemoryWordlist::from_lines(["x"]),
            &AuditOptions::default(),
        )
        .unwrap();
        assert!(result.issues().is_empty());
        assert!(result.recommendations().is_empty());
        assert!(!result.has_findings());
        assert!(matches!(
            result.recovery(),
            RecoveryOutcome::Skipped {
                reason: SkipReason::NonSymmetric,
                ..
            }
        ));
    }
}
