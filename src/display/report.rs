//! Rendering of audit results for the terminal and for JSON consumers.

use std::fmt::Write as _;

use serde_json::{Value, json};

use crate::core::audit::AuditResult;
use crate::core::recovery::RecoveryOutcome;
use crate::display::json_printer::render_json;

/// Build the machine-readable form of an audit result.
pub fn audit_to_json(result: &AuditResult) -> Value {
    json!({
        "header": result.header(),
        "payload": result.payload(),
        "signature": result.signature().hex(),
        "evaluated_at": result.evaluated_at().to_rfc3339(),
        "issues": result
            .issues()
            .iter()
            .map(|issue| json!({"kind": issue.kind.as_str(), "description": issue.description}))
            .collect::<Vec<_>>(),
        "recommendations": result
            .recommendations()
            .iter()
            .map(|rec| rec.description.as_str())
            .collect::<Vec<_>>(),
        "secret_recovery": recovery_to_json(result.recovery()),
    })
}

fn recovery_to_json(outcome: &RecoveryOutcome) -> Value {
    match outcome {
        RecoveryOutcome::Skipped { algorithm, reason } => json!({
            "status": outcome.label(),
            "algorithm": algorithm,
            "reason": reason.as_str(),
        }),
        RecoveryOutcome::Recovered {
            secret, attempts, ..
        } => json!({
            "status": outcome.label(),
            "secret": secret.as_str(),
            "attempts": attempts,
        }),
        RecoveryOutcome::NotFound { attempts } | RecoveryOutcome::Cancelled { attempts } => json!({
            "status": outcome.label(),
            "attempts": attempts,
        }),
        RecoveryOutcome::Unavailable { cause } => json!({
            "status": outcome.label(),
            "cause": cause.to_string(),
        }),
    }
}

/// One-line human summary of a recovery outcome.
pub fn describe_recovery(outcome: &RecoveryOutcome) -> String {
    match outcome {
        RecoveryOutcome::Skipped { algorithm, reason } => {
            format!("skipped ({algorithm}: {})", reason.as_str().replace('_', " "))
        }
        RecoveryOutcome::Recovered {
            secret, attempts, ..
        } => format!(
            "RECOVERED secret '{}' after {attempts} attempt(s)",
            secret.as_str()
        ),
        RecoveryOutcome::NotFound { attempts } => {
            format!("no weak secret found ({attempts} candidate(s) tried)")
        }
        RecoveryOutcome::Unavailable { cause } => format!("unavailable: {cause}"),
        RecoveryOutcome::Cancelled { attempts } => {
            format!("cancelled after {attempts} candidate(s)")
        }
    }
}

/// Render the full human-readable report.
pub fn render_text(result: &AuditResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Evaluated at: {}", result.evaluated_at().to_rfc3339());

    section(&mut out, "Header");
    let _ = writeln!(out, "{}", render_json(&Value::Object(result.header().clone())));

    section(&mut out, "Payload");
    let _ = writeln!(out, "{}", render_json(&Value::Object(result.payload().clone())));

    section(&mut out, "Signature");
    match result.signature().hex() {
        Some(hex) => {
            let _ = writeln!(out, "{hex}");
        }
        None => {
            let _ = writeln!(out, "No signature present");
        }
    }

    section(&mut out, "Issues");
    if result.issues().is_empty() {
        let _ = writeln!(out, "No major vulnerabilities detected.");
    }
    for issue in result.issues() {
        let _ = writeln!(out, "[!] {}", issue.description);
    }

    section(&mut out, "Recommendations");
    for rec in result.recommendations() {
        let _ = writeln!(out, "[>] {}", rec.description);
    }

    section(&mut out, "Secret Recovery");
    let _ = writeln!(out, "{}", describe_recovery(result.recovery()));

    out
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "--- {title} ---");
}
