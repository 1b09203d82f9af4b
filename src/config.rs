//! Application configuration constants
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the engine.

// ===== Occurrence Generation Limits =====

/// Default horizon for occurrence generation in days.
/// The Today view only needs today plus a short look-ahead.
pub const DEFAULT_HORIZON_DAYS: u32 = 10;

/// Minimum horizon for occurrence generation in days
pub const MIN_HORIZON_DAYS: u32 = 1;

/// Maximum horizon for occurrence generation in days.
/// Occurrences are recomputed on every call; a bounded horizon keeps
/// generation cheap enough to never need caching.
pub const MAX_HORIZON_DAYS: u32 = 30;

/// Monthly and seasonal schedules clamp day-of-month to this value so
/// every month of every year has the scheduled day. Month-length edge
/// cases are avoided entirely rather than clamped per month.
pub const MAX_SCHEDULE_MONTH_DAY: u8 = 28;

/// Offset (in days from today) up to which an occurrence is bucketed
/// as "next3" rather than "later"
pub const NEXT3_BUCKET_MAX_OFFSET: i64 = 3;

// ===== Ledger Limits =====

/// Default number of recent ledger entries fetched for status folding.
/// Large enough to cover every occurrence inside the generation horizon
/// for a busy household.
pub const DEFAULT_LEDGER_WINDOW: u32 = 500;

/// Maximum ledger entries fetched in a single query (range queries for
/// leaderboards may scan further back than the status window)
pub const MAX_LEDGER_WINDOW: u32 = 2000;

// ===== Template Validation Boundaries =====

/// Minimum points awarded per completion
pub const MIN_TEMPLATE_POINTS: i64 = 1;

/// Maximum points awarded per completion
pub const MAX_TEMPLATE_POINTS: i64 = 1000;

/// Maximum length for a chore title
pub const MAX_TITLE_LENGTH: usize = 120;

/// Maximum number of explicit months in a seasonal schedule
pub const MAX_SEASONAL_MONTHS: usize = 4;

// ===== Streak Limits =====

/// How many days back the streak walk may go before giving up
pub const STREAK_LOOKBACK_DAYS: u32 = 30;
