//! Points and streak aggregation
//!
//! The leaderboard is a second, simpler fold over the same ledger the
//! status reducer consumes: per-member point totals and completion
//! counts for a time range, plus a consecutive-day streak walk.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate, TimeZone};
use serde::Serialize;

use crate::calendar::Calendar;
use crate::config;
use crate::database::{LedgerEntry, Member};
use crate::ledger::Reason;

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub member_id: String,
    pub name: String,
    pub points: i64,
    pub chores: u32,
}

/// Sum completion points per member over `[start_ms, end_ms)`.
///
/// Only `Completed:` entries count; skips and undos never appear on the
/// board. An undone completion still shows until its undo lands inside
/// the queried window, which is acceptable for live views.
/// Every member gets a row, zeroed when they did nothing. Rows are
/// sorted by points descending, name ascending for ties.
pub fn compute_leaderboard(
    entries: &[LedgerEntry],
    members: &[Member],
    start_ms: i64,
    end_ms: i64,
) -> Vec<LeaderboardRow> {
    let mut totals: HashMap<&str, (i64, u32)> = HashMap::new();

    for entry in entries {
        let created = entry.created_at.timestamp_millis();
        if created < start_ms || created >= end_ms {
            continue;
        }
        if !matches!(Reason::parse(&entry.reason), Some(Reason::Completed(_))) {
            continue;
        }

        let (points, chores) = totals.entry(entry.actor_id.as_str()).or_default();
        *points += entry.delta;
        *chores += 1;
    }

    let mut rows: Vec<LeaderboardRow> = members
        .iter()
        .map(|m| {
            let (points, chores) = totals.get(m.id.as_str()).copied().unwrap_or_default();
            LeaderboardRow {
                member_id: m.id.clone(),
                name: m.name.clone(),
                points,
                chores,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Count consecutive local days with at least one completion by `actor_id`,
/// walking backward from today. A streak kept alive through yesterday
/// still counts when today's chore simply has not happened yet. Capped at
/// [`config::STREAK_LOOKBACK_DAYS`].
pub fn streak_days<Tz: TimeZone>(
    entries: &[LedgerEntry],
    actor_id: &str,
    cal: &Calendar<Tz>,
    now_ms: i64,
) -> u32 {
    let completed_days: HashSet<NaiveDate> = entries
        .iter()
        .filter(|e| e.actor_id == actor_id && e.delta > 0)
        .filter(|e| matches!(Reason::parse(&e.reason), Some(Reason::Completed(_))))
        .map(|e| cal.local_date(e.created_at.timestamp_millis()))
        .collect();

    let today = cal.local_date(now_ms);
    let mut day = if completed_days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while completed_days.contains(&day) && streak < config::STREAK_LOOKBACK_DAYS {
        streak += 1;
        day -= Duration::days(1);
    }

    streak
}
