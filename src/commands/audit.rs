//! Handler for the `audit` subcommand.
//!
//! Runs the full audit (decode, weakness analysis, HMAC secret
//! recovery) and renders the result as text or JSON.

use std::time::{Duration, Instant};

use anyhow::Result;

use jwt_audit::core::audit::{AuditOptions, AuditResult, audit_token};
use jwt_audit::core::recovery::RecoveryOptions;
use jwt_audit::core::time_travel::parse_time_expression;
use jwt_audit::core::wordlist::WordlistFile;
use jwt_audit::display::json_printer::print_json;
use jwt_audit::display::report::{audit_to_json, render_text};

use crate::cli::AuditArgs;
use crate::commands::resolve_token;

/// Execute the `audit` subcommand with the given arguments.
///
/// Returns the completed audit so the caller can pick an exit code.
pub fn execute(args: &AuditArgs) -> Result<AuditResult> {
    let token = resolve_token(&args.input)?;

    let evaluated_at = args
        .at
        .as_deref()
        .map(parse_time_expression)
        .transpose()?
        .map(|target| target.timestamp);

    let options = AuditOptions {
        evaluated_at,
        skip_recovery: args.no_brute_force,
        recovery: RecoveryOptions {
            workers: usize::from(args.threads),
            deadline: args
                .timeout
                .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs))),
            ..RecoveryOptions::default()
        },
    };

    tracing::debug!(wordlist = %args.wordlist.display(), threads = args.threads, "starting audit");
    let result = audit_token(&token, WordlistFile::new(&args.wordlist), &options)?;

    if args.json {
        print_json(&audit_to_json(&result));
    } else {
        print!("{}", render_text(&result));
    }

    Ok(result)
}
