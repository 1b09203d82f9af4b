//! Ledger folds
//!
//! Everything derived from the append-only points ledger: the tagged
//! reason classification, the per-occurrence status reducer, and the
//! leaderboard/streak aggregation.

pub mod reason;
pub mod score;
pub mod status;

pub use reason::Reason;
pub use score::{compute_leaderboard, streak_days, LeaderboardRow};
pub use status::{fold_status, is_open, OccurrenceKey, OccurrenceStatus};
