//! JSON pretty-printing for terminal output.

use serde_json::Value;

/// Render a JSON value with 2-space indentation.
///
/// Falls back to compact rendering if pretty-printing fails, which
/// `serde_json` only does for non-string map keys.
pub fn render_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Print a JSON value with 2-space indentation to stdout.
pub fn print_json(value: &Value) {
    println!("{}", render_json(value));
}
