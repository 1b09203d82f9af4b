//! Occurrence scheduling
//!
//! Deterministic expansion of chore templates into calendar occurrences.

pub mod occurrence;

pub use occurrence::{generate_occurrences, Bucket, Occurrence};
