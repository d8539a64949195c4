//! Handler for the `decode` subcommand.
//!
//! Decodes and pretty-prints a JWT's header and payload without
//! auditing it. Supports reading the token from a CLI argument,
//! environment variable, or stdin.

use anyhow::Result;
use chrono::Utc;
use serde_json::{Value, json};

use jwt_audit::core::decoder::decode_token;
use jwt_audit::display::json_printer::print_json;
use jwt_audit::display::token_status::display_token_status;

use crate::cli::DecodeArgs;
use crate::commands::resolve_token;

/// Execute the `decode` subcommand with the given arguments.
pub fn execute(args: &DecodeArgs) -> Result<()> {
    let token = resolve_token(&args.input)?;
    let decoded = decode_token(&token)?;

    if args.json {
        print_json(&json!({
            "header": decoded.header,
            "payload": decoded.payload,
            "signature": decoded.signature.hex(),
        }));
        return Ok(());
    }

    println!("--- Header ---");
    print_json(&Value::Object(decoded.header.clone()));
    println!();
    println!("--- Payload ---");
    print_json(&Value::Object(decoded.payload.clone()));
    println!();
    println!("--- Signature ---");
    println!(
        "{}",
        decoded
            .signature
            .hex()
            .unwrap_or_else(|| "No signature present".to_string())
    );
    println!();
    println!("--- Token Status ---");
    display_token_status(&decoded.payload, Utc::now());

    Ok(())
}
