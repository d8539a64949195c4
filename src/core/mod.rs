//! Core business logic for token auditing.
//!
//! This module contains the domain logic separated from CLI concerns.
//! All types and functions here are testable without the CLI layer.

pub mod analyzer;
pub mod audit;
pub mod decoder;
pub mod recovery;
pub mod signature;
pub mod time_travel;
pub mod wordlist;
