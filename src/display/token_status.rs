//! Token status display for temporal claims.
//!
//! Renders human-readable status information for JWT temporal claims
//! (`exp`, `iat`, `nbf`) relative to an evaluation instant.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::decoder::JsonObject;

/// Build the status lines for a payload's temporal claims.
///
/// - Expired tokens: "EXPIRED (X ago)"
/// - Valid tokens: "VALID (expires in X)"
/// - Not-yet-valid tokens: "NOT YET VALID (valid in X)"
pub fn token_status_lines(payload: &JsonObject, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(iat) = claim_time(payload, "iat") {
        lines.push(format!("Issued at:  {}", iat.to_rfc3339()));
    }

    if let Some(nbf) = claim_time(payload, "nbf") {
        if nbf > now {
            lines.push(format!(
                "Not before: {} NOT YET VALID (valid in {})",
                nbf.to_rfc3339(),
                humanize((nbf - now).num_seconds())
            ));
        } else {
            lines.push(format!("Not before: {}", nbf.to_rfc3339()));
        }
    }

    match (payload.get("exp"), claim_time(payload, "exp")) {
        (_, Some(exp)) if exp < now => lines.push(format!(
            "Expires:    {} EXPIRED ({} ago)",
            exp.to_rfc3339(),
            humanize((now - exp).num_seconds())
        )),
        (_, Some(exp)) => lines.push(format!(
            "Expires:    {} VALID (expires in {})",
            exp.to_rfc3339(),
            humanize((exp - now).num_seconds())
        )),
        (None | Some(Value::Null), None) => lines.push("Expires:    never (no exp claim)".to_string()),
        (Some(raw), None) => lines.push(format!("Expires:    unreadable value {raw}")),
    }

    lines
}

/// Print the temporal status of a JWT's claims to stdout.
pub fn display_token_status(payload: &JsonObject, now: DateTime<Utc>) {
    for line in token_status_lines(payload, now) {
        println!("  {line}");
    }
}

fn claim_time(payload: &JsonObject, claim: &str) -> Option<DateTime<Utc>> {
    let value = payload.get(claim)?;
    let secs = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.abs() < 1e15)
            .map(|f| f as i64)
    })?;
    DateTime::from_timestamp(secs, 0)
}

/// Render a non-negative number of seconds as e.g. "2d 3h" or "45s".
fn humanize(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (days, hours, minutes, secs) = (
        seconds / 86_400,
        (seconds % 86_400) / 3_600,
        (seconds % 3_600) / 60,
        seconds % 60,
    );
    match (days, hours, minutes) {
        (0, 0, 0) => format!("{secs}s"),
        (0, 0, m) => format!("{m}m {secs}s"),
        (0, h, m) => format!("{h}h {m}m"),
        (d, h, _) => format!("{d}d {h}h"),
    }
}
