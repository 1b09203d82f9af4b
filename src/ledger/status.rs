//! Ledger status reducer
//!
//! Folds the append-only ledger into a per-occurrence status map. There
//! is no cached or incremental status anywhere: the history is always
//! re-read and re-folded, so this fold is the single source of truth for
//! "is this occurrence still open".
//!
//! Storage does not guarantee entry order, so the fold must commute:
//! completions and undos are tallied as separate counters and the net
//! count is only clamped when read. Any permutation of the same entries
//! therefore produces the same map.

use std::collections::HashMap;
use std::fmt;

use crate::database::LedgerEntry;
use crate::ledger::Reason;

/// Natural key of an occurrence: (template, local day). Stable and
/// reconstructible from the template alone, so occurrences never need
/// their own storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceKey {
    pub template_id: String,
    pub day_key: String,
}

impl OccurrenceKey {
    pub fn new(template_id: &str, day_key: &str) -> Self {
        Self {
            template_id: template_id.to_string(),
            day_key: day_key.to_string(),
        }
    }
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}", self.template_id, self.day_key)
    }
}

/// Folded state of one occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceStatus {
    completions: u32,
    undos: u32,
    skipped: bool,
    /// Most recent activity timestamp (ms) seen for this key
    last_at_ms: i64,
}

impl OccurrenceStatus {
    /// Net completion count, floored at zero
    pub fn completed_count(&self) -> u32 {
        self.completions.saturating_sub(self.undos)
    }

    /// Sticky: once an occurrence is skipped no entry type clears it
    pub fn skipped(&self) -> bool {
        self.skipped
    }

    pub fn last_at_ms(&self) -> i64 {
        self.last_at_ms
    }

    /// Resolved as completed; a skip always dominates a completion
    pub fn is_resolved_completed(&self) -> bool {
        self.completed_count() > 0 && !self.skipped
    }

    /// Still actionable: neither skipped nor net-completed
    pub fn is_open(&self) -> bool {
        !self.skipped && self.completed_count() == 0
    }
}

/// Fold ledger entries into a status map keyed by occurrence.
///
/// Entries without both `template_id` and `day_key`, and entries whose
/// reason is not one of the canonical shapes, are ignored here (they may
/// still count for the points aggregator).
pub fn fold_status(entries: &[LedgerEntry]) -> HashMap<OccurrenceKey, OccurrenceStatus> {
    let mut map: HashMap<OccurrenceKey, OccurrenceStatus> = HashMap::new();

    for entry in entries {
        let (Some(template_id), Some(day_key)) = (&entry.template_id, &entry.day_key) else {
            continue;
        };
        if template_id.is_empty() || day_key.is_empty() {
            continue;
        }
        let Some(reason) = Reason::parse(&entry.reason) else {
            continue;
        };

        let status = map
            .entry(OccurrenceKey::new(template_id, day_key))
            .or_default();

        let created_ms = entry.created_at.timestamp_millis();
        if created_ms > status.last_at_ms {
            status.last_at_ms = created_ms;
        }

        match reason {
            Reason::Completed(_) if entry.delta > 0 => status.completions += 1,
            Reason::Undo(_) if entry.delta < 0 => status.undos += 1,
            Reason::Skipped(_) => status.skipped = true,
            // Completed/Undo with the wrong delta sign: malformed, ignored
            _ => {}
        }
    }

    map
}

/// Whether the occurrence for `key` is still open given a folded map.
/// Absent keys are open: nothing has happened to them yet.
pub fn is_open(map: &HashMap<OccurrenceKey, OccurrenceStatus>, key: &OccurrenceKey) -> bool {
    map.get(key).map_or(true, OccurrenceStatus::is_open)
}
