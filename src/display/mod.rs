//! Terminal display and formatting utilities.
//!
//! Renders decoded tokens and audit results either as human-readable
//! text or as a single JSON document for machine consumption.

pub mod json_printer;
pub mod report;
pub mod token_status;
