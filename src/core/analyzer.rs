//! Rule-based security analysis of a decoded token.
//!
//! The checks live in [`RULES`], an ordered table of independent rules.
//! Every rule runs on every token and contributes at most one finding,
//! so the issue order always follows the table order.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::core::audit::{Issue, IssueKind, Recommendation};
use crate::core::decoder::JsonObject;

/// Algorithms accepted without a "suspicious algorithm" finding.
pub const ALLOWED_ALGORITHMS: [&str; 10] = [
    "HS256", "HS384", "HS512", "RS256", "RS384", "RS512", "ES256", "ES384", "ES512", "EdDSA",
];

/// Roles that should never be granted by a bearer token alone.
const PRIVILEGED_ROLES: [&str; 3] = ["admin", "superuser", "root"];

/// Longest expiry window that is not reported as excessive.
const MAX_EXPIRY_WINDOW: TimeDelta = TimeDelta::hours(24);

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub header: &'a JsonObject,
    pub payload: &'a JsonObject,
    pub now: DateTime<Utc>,
}

/// One issue and the optional recommendation that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub issue: Issue,
    pub recommendation: Option<Recommendation>,
}

impl Finding {
    fn new(kind: IssueKind, issue: impl Into<String>, recommendation: &str) -> Self {
        Self {
            issue: Issue::new(kind, issue),
            recommendation: Some(Recommendation::new(recommendation)),
        }
    }

    fn informational(kind: IssueKind, issue: impl Into<String>) -> Self {
        Self {
            issue: Issue::new(kind, issue),
            recommendation: None,
        }
    }
}

/// A named predicate over the decoded token.
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&RuleContext<'_>) -> Option<Finding>,
}

/// The fixed rule set, in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "alg-none",
        check: check_alg_none,
    },
    Rule {
        name: "alg-missing",
        check: check_alg_missing,
    },
    Rule {
        name: "alg-allow-list",
        check: check_alg_allow_list,
    },
    Rule {
        name: "expiration",
        check: check_expiration,
    },
    Rule {
        name: "admin-claim",
        check: check_admin_claim,
    },
    Rule {
        name: "privileged-role",
        check: check_privileged_role,
    },
];

/// The ordered output of the analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
}

/// Analyze a decoded header and payload at the current UTC time.
pub fn analyze(header: &JsonObject, payload: &JsonObject) -> Analysis {
    analyze_at(header, payload, Utc::now())
}

/// Analyze a decoded header and payload as of `now`.
///
/// Runs every rule in [`RULES`]; none short-circuits another.
pub fn analyze_at(header: &JsonObject, payload: &JsonObject, now: DateTime<Utc>) -> Analysis {
    let ctx = RuleContext {
        header,
        payload,
        now,
    };

    let mut analysis = Analysis::default();
    for rule in RULES {
        if let Some(finding) = (rule.check)(&ctx) {
            tracing::debug!(rule = rule.name, kind = ?finding.issue.kind, "rule matched");
            analysis.issues.push(finding.issue);
            analysis.recommendations.extend(finding.recommendation);
        }
    }
    analysis
}

fn check_alg_none(ctx: &RuleContext<'_>) -> Option<Finding> {
    let alg = ctx.header.get("alg")?.as_str()?;
    alg.eq_ignore_ascii_case("none").then(|| {
        Finding::new(
            IssueKind::UnsignedAlgorithm,
            "Token uses alg=none: unsigned algorithm accepted",
            "Never accept tokens with alg=none",
        )
    })
}

fn check_alg_missing(ctx: &RuleContext<'_>) -> Option<Finding> {
    match ctx.header.get("alg") {
        None | Some(Value::Null) => Some(Finding::new(
            IssueKind::MissingAlgorithm,
            "Missing algorithm header (algorithm confusion risk)",
            "Reject tokens that do not declare an explicit alg",
        )),
        Some(_) => None,
    }
}

fn check_alg_allow_list(ctx: &RuleContext<'_>) -> Option<Finding> {
    let alg = match ctx.header.get("alg")? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let allowed = ALLOWED_ALGORITHMS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(&alg));
    (!allowed).then(|| {
        Finding::new(
            IssueKind::SuspiciousAlgorithm,
            format!("Suspicious/unsupported algorithm: {alg}"),
            "Restrict to strong asymmetric algorithms (RS256, ES256, EdDSA)",
        )
    })
}

fn check_expiration(ctx: &RuleContext<'_>) -> Option<Finding> {
    let exp = match ctx.payload.get("exp") {
        None | Some(Value::Null) => {
            return Some(Finding::new(
                IssueKind::MissingExpiration,
                "Missing expiration (exp)",
                "Always set a short-lived expiration",
            ));
        }
        Some(value) => value,
    };

    let Some(expires_at) = exp_to_datetime(exp) else {
        return Some(Finding::new(
            IssueKind::InvalidExpiration,
            "Invalid exp format",
            "Use a Unix timestamp (seconds since epoch) for exp",
        ));
    };

    if expires_at < ctx.now {
        Some(Finding::informational(
            IssueKind::Expired,
            "Token already expired",
        ))
    } else if expires_at - ctx.now > MAX_EXPIRY_WINDOW {
        Some(Finding::new(
            IssueKind::LongExpiry,
            "Expiry exceeds 24 hours",
            "Bound token expiry under 24h",
        ))
    } else {
        None
    }
}

/// Interpret a JSON number as Unix seconds. Anything else is invalid.
fn exp_to_datetime(exp: &Value) -> Option<DateTime<Utc>> {
    let Value::Number(number) = exp else {
        return None;
    };
    if let Some(secs) = number.as_i64() {
        return DateTime::from_timestamp(secs, 0);
    }
    let secs = number.as_f64()?;
    if !secs.is_finite() || secs.abs() > i64::MAX as f64 {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

fn check_admin_claim(ctx: &RuleContext<'_>) -> Option<Finding> {
    (ctx.payload.get("admin") == Some(&Value::Bool(true))).then(|| {
        Finding::new(
            IssueKind::PrivilegedClaim,
            "Privileged claim present: admin=true",
            "Avoid embedding authorization decisions in the token payload",
        )
    })
}

fn check_privileged_role(ctx: &RuleContext<'_>) -> Option<Finding> {
    let role = ctx.payload.get("role")?.as_str()?;
    let lowered = role.to_lowercase();
    PRIVILEGED_ROLES.contains(&lowered.as_str()).then(|| {
        Finding::new(
            IssueKind::PrivilegedRole,
            format!("Privileged role claim: {role}"),
            "Perform authorization checks server-side, not via token claims",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn run(header: Value, payload: Value) -> Analysis {
        analyze_at(&object(header), &object(payload), now())
    }

    fn kinds(analysis: &Analysis) -> Vec<IssueKind> {
        analysis.issues.iter().map(|i| i.kind).collect()
    }

    fn healthy_payload() -> Value {
        json!({"sub": "42", "exp": 1_700_000_000 + 3_600})
    }

    #[test]
    fn test_clean_token_has_no_findings() {
        let analysis = run(json!({"alg": "RS256"}), healthy_payload());
        assert!(analysis.issues.is_empty());
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_alg_none_reports_single_unsigned_issue_any_case() {
        for alg in ["none", "NONE", "nOnE"] {
            let analysis = run(json!({"alg": alg}), healthy_payload());
            let unsigned = analysis
                .issues
                .iter()
                .filter(|i| i.kind == IssueKind::UnsignedAlgorithm)
                .count();
            assert_eq!(unsigned, 1, "alg={alg}");
            // alg=none is also outside the allow-list
            assert!(kinds(&analysis).contains(&IssueKind::SuspiciousAlgorithm));
        }
    }

    #[test]
    fn test_unknown_algorithm_is_suspicious() {
        let analysis = run(json!({"alg": "HS1"}), healthy_payload());
        assert_eq!(kinds(&analysis), vec![IssueKind::SuspiciousAlgorithm]);
        assert!(analysis.issues[0].description.contains("HS1"));
        assert_eq!(analysis.recommendations.len(), 1);
    }

    #[test]
    fn test_allow_list_is_case_insensitive() {
        for alg in ["hs256", "Rs512", "EdDSA", "eddsa", "ES384"] {
            let analysis = run(json!({"alg": alg}), healthy_payload());
            assert!(analysis.issues.is_empty(), "alg={alg}");
        }
    }

    #[test]
    fn test_missing_alg_is_its_own_issue() {
        let analysis = run(json!({"typ": "JWT"}), healthy_payload());
        assert_eq!(kinds(&analysis), vec![IssueKind::MissingAlgorithm]);
    }

    #[test]
    fn test_non_string_alg_is_suspicious() {
        let analysis = run(json!({"alg": 256}), healthy_payload());
        assert_eq!(kinds(&analysis), vec![IssueKind::SuspiciousAlgorithm]);
        assert!(analysis.issues[0].description.ends_with("256"));
    }

    #[test]
    fn test_missing_exp() {
        let analysis = run(json!({"alg": "HS256"}), json!({"sub": "42"}));
        assert_eq!(kinds(&analysis), vec![IssueKind::MissingExpiration]);
        assert_eq!(analysis.recommendations.len(), 1);
    }

    #[test]
    fn test_null_exp_counts_as_missing() {
        let analysis = run(json!({"alg": "HS256"}), json!({"exp": null}));
        assert_eq!(kinds(&analysis), vec![IssueKind::MissingExpiration]);
    }

    #[test]
    fn test_invalid_exp_format() {
        for exp in [json!("tomorrow"), json!(true), json!([1]), json!(1e300)] {
            let analysis = run(json!({"alg": "HS256"}), json!({ "exp": exp }));
            assert_eq!(kinds(&analysis), vec![IssueKind::InvalidExpiration]);
            assert_eq!(analysis.recommendations.len(), 1);
        }
    }

    #[test]
    fn test_expired_token_has_no_recommendation() {
        let analysis = run(json!({"alg": "HS256"}), json!({"exp": 1_699_999_999}));
        assert_eq!(kinds(&analysis), vec![IssueKind::Expired]);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_exp_equal_to_now_is_not_expired() {
        let analysis = run(json!({"alg": "HS256"}), json!({"exp": 1_700_000_000}));
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn test_fractional_exp_is_accepted() {
        let analysis = run(json!({"alg": "HS256"}), json!({"exp": 1_700_000_100.5}));
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn test_long_expiry() {
        let analysis = run(
            json!({"alg": "HS256"}),
            json!({"exp": 1_700_000_000 + 24 * 3_600 + 1}),
        );
        assert_eq!(kinds(&analysis), vec![IssueKind::LongExpiry]);
        assert_eq!(analysis.recommendations.len(), 1);
    }

    #[test]
    fn test_expiry_of_exactly_24_hours_is_fine() {
        let analysis = run(
            json!({"alg": "HS256"}),
            json!({"exp": 1_700_000_000 + 24 * 3_600}),
        );
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn test_admin_true_is_privileged() {
        let mut payload = healthy_payload();
        payload["admin"] = json!(true);
        let analysis = run(json!({"alg": "HS256"}), payload);
        assert_eq!(kinds(&analysis), vec![IssueKind::PrivilegedClaim]);
    }

    #[test]
    fn test_admin_truthy_values_are_ignored() {
        for admin in [json!("true"), json!(1), json!(false)] {
            let mut payload = healthy_payload();
            payload["admin"] = admin;
            let analysis = run(json!({"alg": "HS256"}), payload);
            assert!(analysis.issues.is_empty());
        }
    }

    #[test]
    fn test_privileged_roles_any_case() {
        for role in ["admin", "SuperUser", "ROOT"] {
            let mut payload = healthy_payload();
            payload["role"] = json!(role);
            let analysis = run(json!({"alg": "HS256"}), payload);
            assert_eq!(kinds(&analysis), vec![IssueKind::PrivilegedRole]);
            assert!(analysis.issues[0].description.ends_with(role));
        }
    }

    #[test]
    fn test_ordinary_and_non_string_roles_are_ignored() {
        for role in [json!("editor"), json!(["admin"]), json!(7)] {
            let mut payload = healthy_payload();
            payload["role"] = role;
            let analysis = run(json!({"alg": "HS256"}), payload);
            assert!(analysis.issues.is_empty());
        }
    }

    #[test]
    fn test_all_rules_run_in_table_order() {
        let analysis = run(
            json!({"alg": "none"}),
            json!({"admin": true, "role": "root"}),
        );
        assert_eq!(
            kinds(&analysis),
            vec![
                IssueKind::UnsignedAlgorithm,
                IssueKind::SuspiciousAlgorithm,
                IssueKind::MissingExpiration,
                IssueKind::PrivilegedClaim,
                IssueKind::PrivilegedRole,
            ]
        );
        assert_eq!(analysis.recommendations.len(), 5);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let header = object(json!({"alg": "none"}));
        let payload = object(json!({"role": "admin", "exp": "soon"}));
        assert_eq!(
            analyze_at(&header, &payload, now()),
            analyze_at(&header, &payload, now())
        );
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }
}
