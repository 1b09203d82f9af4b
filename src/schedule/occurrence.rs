//! Occurrence generation
//!
//! Expands chore templates into concrete calendar occurrences over a
//! bounded horizon. Occurrences are derived data: the same templates and
//! the same `now` always produce the same list, so nothing here is ever
//! persisted or cached. Callers regenerate on every view.

use chrono::{Datelike, Duration, Months, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::calendar::{day_key_of, Calendar};
use crate::config;
use crate::database::{ChoreTemplate, Frequency, Schedule};
use crate::ledger::OccurrenceKey;

/// Coarse recency label for display grouping. Derived from the day
/// offset on every call, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Today,
    Next3,
    Later,
}

impl Bucket {
    fn for_offset(offset: i64) -> Bucket {
        if offset == 0 {
            Bucket::Today
        } else if offset <= config::NEXT3_BUCKET_MAX_OFFSET {
            Bucket::Next3
        } else {
            Bucket::Later
        }
    }
}

/// One calendar instance of a chore template.
///
/// Identified by (template_id, day_key); reconstructible from the
/// template alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub template_id: String,
    pub day_key: String,
    /// Local midnight of the due day, in epoch milliseconds
    pub due_at_ms: i64,
    pub bucket: Bucket,
}

impl Occurrence {
    pub fn key(&self) -> OccurrenceKey {
        OccurrenceKey::new(&self.template_id, &self.day_key)
    }
}

/// Expand templates into sorted occurrences within
/// `[today, today + horizon_days]`.
///
/// Inactive templates produce nothing; an empty template list yields an
/// empty result. Out-of-range schedule overrides are clamped, never an
/// error. Ordering is total: due instant ascending, then template id
/// ascending, and the output carries no duplicate (template, day) pairs.
pub fn generate_occurrences<Tz: TimeZone>(
    templates: &[ChoreTemplate],
    cal: &Calendar<Tz>,
    now_ms: i64,
    horizon_days: u32,
) -> Vec<Occurrence> {
    let horizon = horizon_days.clamp(config::MIN_HORIZON_DAYS, config::MAX_HORIZON_DAYS) as i64;
    let today = cal.local_date(now_ms);

    let mut out: Vec<Occurrence> = Vec::new();

    for template in templates.iter().filter(|t| t.active) {
        let schedule = template.schedule().map(Schedule::clamped);
        let anchor = cal.local_date(template.anchor_ms());

        match template.frequency {
            Frequency::Daily => {
                for offset in 0..=horizon {
                    push(&mut out, cal, template, today + Duration::days(offset), offset);
                }
            }
            Frequency::Weekly => {
                let target = schedule
                    .as_ref()
                    .and_then(|s| s.week_day)
                    .unwrap_or(anchor.weekday().num_days_from_monday() as u8)
                    .min(6) as i64;
                let first = (target - today.weekday().num_days_from_monday() as i64).rem_euclid(7);

                let mut offset = first;
                while offset <= horizon {
                    push(&mut out, cal, template, today + Duration::days(offset), offset);
                    offset += 7;
                }
            }
            Frequency::Monthly => {
                let dom = schedule
                    .as_ref()
                    .and_then(|s| s.month_day)
                    .unwrap_or(anchor.day() as u8)
                    .clamp(1, config::MAX_SCHEDULE_MONTH_DAY);
                emit_on_months(&mut out, cal, template, today, horizon, dom, |_| true);
            }
            Frequency::Seasonal => {
                match schedule.as_ref().and_then(|s| s.months.clone()) {
                    // Explicit month-set policy: the template names its
                    // target months and day directly.
                    Some(months) => {
                        let dom = schedule
                            .as_ref()
                            .and_then(|s| s.season_day)
                            .unwrap_or(anchor.day() as u8)
                            .clamp(1, config::MAX_SCHEDULE_MONTH_DAY);
                        emit_on_months(&mut out, cal, template, today, horizon, dom, |month| {
                            months.contains(&(month as u8))
                        });
                    }
                    // Fallback: every third calendar month, phased to the
                    // anchor month, on the anchor's day-of-month.
                    None => {
                        let dom =
                            (anchor.day() as u8).clamp(1, config::MAX_SCHEDULE_MONTH_DAY);
                        let anchor_month = anchor.month();
                        emit_on_months(&mut out, cal, template, today, horizon, dom, |month| {
                            (month as i64 - anchor_month as i64).rem_euclid(3) == 0
                        });
                    }
                }
            }
        }
    }

    out.sort_by(|a, b| {
        a.due_at_ms
            .cmp(&b.due_at_ms)
            .then_with(|| a.template_id.cmp(&b.template_id))
    });
    out.dedup_by(|a, b| a.template_id == b.template_id && a.day_key == b.day_key);

    out
}

fn push<Tz: TimeZone>(
    out: &mut Vec<Occurrence>,
    cal: &Calendar<Tz>,
    template: &ChoreTemplate,
    date: NaiveDate,
    offset: i64,
) {
    out.push(Occurrence {
        template_id: template.id.clone(),
        day_key: day_key_of(date),
        due_at_ms: cal.date_start_ms(date),
        bucket: Bucket::for_offset(offset),
    });
}

/// Emit one occurrence per accepted calendar month at `dom`, for every
/// month whose `dom` falls inside the horizon. `dom <= 28`, so the day
/// exists in every month and no per-month clamping is needed.
fn emit_on_months<Tz: TimeZone>(
    out: &mut Vec<Occurrence>,
    cal: &Calendar<Tz>,
    template: &ChoreTemplate,
    today: NaiveDate,
    horizon: i64,
    dom: u8,
    accept_month: impl Fn(u32) -> bool,
) {
    let month_cursor = today.with_day(1).unwrap_or(today);

    // A 30-day horizon spans at most three calendar months
    for m in 0u32..=2 {
        let Some(month_start) = month_cursor.checked_add_months(Months::new(m)) else {
            break;
        };
        if !accept_month(month_start.month()) {
            continue;
        }
        let date = month_start.with_day(dom as u32).unwrap_or(month_start);
        let offset = (date - today).num_days();
        if offset < 0 {
            continue;
        }
        if offset > horizon {
            break;
        }
        push(out, cal, template, date, offset);
    }
}
