//! chorequest engine
//!
//! Occurrence scheduling and ledger reconciliation for a household chore
//! tracker. Chore templates expand deterministically into calendar
//! occurrences; completions, skips, and undos live in an append-only
//! points ledger; every view is derived by re-folding that ledger.
//! Occurrences themselves are never stored.

pub mod assign;
pub mod calendar;
pub mod config;
pub mod database;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod schedule;
pub mod services;
