//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to a host UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::config;

/// How often a chore template recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Seasonal,
}

/// Who is responsible for a chore occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AssigneeMode {
    Anyone,
    Fixed,
    Rotating,
}

/// Optional explicit schedule override for a template.
///
/// When absent, the recurrence is phased to the template's creation
/// timestamp (its anchor). Stored as a JSON text column; unknown fields
/// are ignored so old rows keep parsing after schema growth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    /// Weekday for weekly chores, 0 = Monday .. 6 = Sunday
    pub week_day: Option<u8>,
    /// Day of month for monthly chores, 1..=28
    pub month_day: Option<u8>,
    /// Explicit target months (1..=12) for seasonal chores
    pub months: Option<Vec<u8>>,
    /// Day of month for seasonal chores, 1..=28
    pub season_day: Option<u8>,
}

/// A recurring chore definition.
///
/// Read-only to the scheduling core; occurrences are always derived from
/// the template, never stored with their own identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChoreTemplate {
    pub id: String,
    pub household_id: String,
    pub title: String,
    pub points: i64,
    pub frequency: Frequency,
    pub assignee_mode: AssigneeMode,
    /// Present iff `assignee_mode` is `Fixed`
    pub fixed_assignee_id: Option<String>,
    pub active: bool,
    /// JSON-encoded [`Schedule`] override
    pub schedule_json: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChoreTemplate {
    /// Parsed schedule override; malformed JSON counts as "no override"
    pub fn schedule(&self) -> Option<Schedule> {
        self.schedule_json
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
    }

    /// Phase reference for the recurrence when no override is given
    pub fn anchor_ms(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

/// Create template request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateRequest {
    pub title: String,
    pub points: i64,
    pub frequency: Frequency,
    pub assignee_mode: AssigneeMode,
    pub fixed_assignee_id: Option<String>,
    pub schedule: Option<Schedule>,
}

/// Update template request; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    pub title: Option<String>,
    pub points: Option<i64>,
    pub frequency: Option<Frequency>,
    pub assignee_mode: Option<AssigneeMode>,
    pub fixed_assignee_id: Option<String>,
    pub active: Option<bool>,
    pub schedule: Option<Schedule>,
}

/// An immutable, append-only fact about a point-affecting action.
///
/// `template_id`/`day_key` link the entry back to an occurrence; both are
/// absent for ad hoc point adjustments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: String,
    pub household_id: String,
    pub actor_id: String,
    pub delta: i64,
    pub reason: String,
    /// Event time, authoritative for "what happened when"
    pub created_at: DateTime<Utc>,
    pub template_id: Option<String>,
    pub day_key: Option<String>,
}

/// New ledger entry; the id is assigned on append
#[derive(Debug, Clone, Deserialize)]
pub struct NewLedgerEntry {
    pub actor_id: String,
    pub delta: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub template_id: Option<String>,
    pub day_key: Option<String>,
}

/// A household member; member ordering (by name) feeds rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

impl Schedule {
    /// Clamp every field into its valid range; generation never fails on
    /// an out-of-range override, it just snaps to the nearest valid value.
    pub fn clamped(mut self) -> Self {
        if let Some(wd) = self.week_day {
            self.week_day = Some(wd.min(6));
        }
        if let Some(md) = self.month_day {
            self.month_day = Some(md.clamp(1, config::MAX_SCHEDULE_MONTH_DAY));
        }
        if let Some(sd) = self.season_day {
            self.season_day = Some(sd.clamp(1, config::MAX_SCHEDULE_MONTH_DAY));
        }
        if let Some(months) = self.months.take() {
            let mut months: Vec<u8> = months
                .into_iter()
                .map(|m| m.clamp(1, 12))
                .collect();
            months.sort_unstable();
            months.dedup();
            months.truncate(config::MAX_SEASONAL_MONTHS);
            if !months.is_empty() {
                self.months = Some(months);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_roundtrip_json() {
        let schedule = Schedule {
            week_day: Some(2),
            ..Default::default()
        };
        let json = serde_json::to_string(&schedule).unwrap();
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schedule);
    }

    #[test]
    fn test_schedule_ignores_unknown_fields() {
        let back: Schedule =
            serde_json::from_str(r#"{"weekDay":3,"someFutureField":true}"#).unwrap();
        assert_eq!(back.week_day, Some(3));
    }

    #[test]
    fn test_schedule_clamping() {
        let schedule = Schedule {
            week_day: Some(9),
            month_day: Some(31),
            season_day: Some(0),
            months: Some(vec![14, 3, 3, 0, 7, 9, 12]),
        }
        .clamped();

        assert_eq!(schedule.week_day, Some(6));
        assert_eq!(schedule.month_day, Some(28));
        assert_eq!(schedule.season_day, Some(1));
        assert_eq!(schedule.months, Some(vec![1, 3, 7, 9]));
    }

    #[test]
    fn test_malformed_schedule_json_is_no_override() {
        let template = ChoreTemplate {
            id: "t1".into(),
            household_id: "h1".into(),
            title: "Dishes".into(),
            points: 10,
            frequency: Frequency::Weekly,
            assignee_mode: AssigneeMode::Anyone,
            fixed_assignee_id: None,
            active: true,
            schedule_json: Some("{not json".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(template.schedule().is_none());
    }
}
