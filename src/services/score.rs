//! Score service
//!
//! Leaderboard and streak views over the ledger. A separate, simpler
//! fold than the status reducer; it never looks at occurrence keys.

use chrono::{Local, TimeZone};

use crate::calendar::{Calendar, RangeKey, MS_PER_DAY};
use crate::config;
use crate::database::Repository;
use crate::error::Result;
use crate::ledger::{compute_leaderboard, streak_days, LeaderboardRow};

/// Service computing leaderboards and streaks
#[derive(Clone)]
pub struct ScoreService<Tz: TimeZone = Local> {
    repo: Repository,
    cal: Calendar<Tz>,
}

impl ScoreService<Local> {
    pub fn new(repo: Repository) -> Self {
        Self::with_calendar(repo, Calendar::local())
    }
}

impl<Tz: TimeZone> ScoreService<Tz> {
    pub fn with_calendar(repo: Repository, cal: Calendar<Tz>) -> Self {
        Self { repo, cal }
    }

    /// Leaderboard rows for a range ending now, one row per member,
    /// sorted by points
    pub async fn leaderboard(
        &self,
        household_id: &str,
        range: RangeKey,
        now_ms: i64,
    ) -> Result<Vec<LeaderboardRow>> {
        let (start_ms, end_ms) = self.cal.range_ms(range, now_ms);
        let entries = self
            .repo
            .list_ledger_entries_in_range(household_id, start_ms, end_ms, config::MAX_LEDGER_WINDOW)
            .await?;
        let members = self.repo.list_members(household_id).await?;

        tracing::debug!(
            "Leaderboard for {} over {:?}: {} entries, {} members",
            household_id,
            range,
            entries.len(),
            members.len()
        );

        Ok(compute_leaderboard(&entries, &members, start_ms, end_ms))
    }

    /// Consecutive-day completion streak for one member
    pub async fn streak(&self, household_id: &str, member_id: &str, now_ms: i64) -> Result<u32> {
        // One day of slack beyond the cap so the walk can start yesterday
        let lookback_ms = (config::STREAK_LOOKBACK_DAYS as i64 + 1) * MS_PER_DAY;
        let entries = self
            .repo
            .list_ledger_entries_in_range(
                household_id,
                now_ms - lookback_ms,
                now_ms + 1,
                config::MAX_LEDGER_WINDOW,
            )
            .await?;

        Ok(streak_days(&entries, member_id, &self.cal, now_ms))
    }
}
