//! Board service
//!
//! Assembles the "what is due" views and owns the three write paths into
//! the ledger (complete, skip, undo). This is the join point of the
//! engine: occurrences from the generator, statuses from the reducer,
//! assignees from the resolver.
//!
//! Templates and ledger are fetched independently and may be slightly
//! stale relative to each other; the pure core tolerates that. Writes
//! are at-least-once: a pre-write "already completed" check would be
//! advisory at best, so the check happens by re-reading status after
//! the append and reporting, never rejecting.

use chrono::{Local, TimeZone, Utc};

use crate::assign::{assignee_label, resolve_assignee};
use crate::calendar::Calendar;
use crate::config;
use crate::database::{ChoreTemplate, LedgerEntry, NewLedgerEntry, Repository};
use crate::error::Result;
use crate::ledger::{fold_status, is_open, OccurrenceKey, Reason};
use crate::schedule::{generate_occurrences, Bucket, Occurrence};

/// One display-ready occurrence: the occurrence itself plus everything
/// the presentation layer shows alongside it
#[derive(Debug, Clone, serde::Serialize)]
pub struct BoardItem {
    pub occurrence: Occurrence,
    pub title: String,
    pub points: i64,
    pub assignee_id: Option<String>,
    /// Display label; empty when anyone may act
    pub assignee_name: String,
}

/// The Today view: open work split by recency, plus today's activity
#[derive(Debug, Clone, serde::Serialize)]
pub struct TodayBoard {
    pub day_key: String,
    pub due_today: Vec<BoardItem>,
    pub next3: Vec<BoardItem>,
    pub completed_today: Vec<LedgerEntry>,
    pub points_earned_today: i64,
}

/// The Plan view: every open occurrence in the horizon, grouped by bucket
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlanBoard {
    pub today: Vec<BoardItem>,
    pub next3: Vec<BoardItem>,
    pub later: Vec<BoardItem>,
}

/// Result of a complete action. `already_completed` is the post-write
/// race check: true when the net count shows someone else got there
/// first. The entry is never rolled back.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CompleteOutcome {
    pub entry: LedgerEntry,
    pub already_completed: bool,
}

/// Service assembling due/resolved views and recording chore actions
#[derive(Clone)]
pub struct BoardService<Tz: TimeZone = Local> {
    repo: Repository,
    cal: Calendar<Tz>,
}

impl BoardService<Local> {
    pub fn new(repo: Repository) -> Self {
        Self::with_calendar(repo, Calendar::local())
    }
}

impl<Tz: TimeZone> BoardService<Tz> {
    /// Use an explicit household calendar (tests pass `Utc` or a fixed
    /// offset for determinism)
    pub fn with_calendar(repo: Repository, cal: Calendar<Tz>) -> Self {
        Self { repo, cal }
    }

    /// Horizon override from settings, clamped into the valid range
    async fn horizon_days(&self, household_id: &str) -> Result<u32> {
        let key = format!("{}:horizon_days", household_id);
        let horizon = self
            .repo
            .get_setting(&key)
            .await?
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(config::DEFAULT_HORIZON_DAYS);
        Ok(horizon.clamp(config::MIN_HORIZON_DAYS, config::MAX_HORIZON_DAYS))
    }

    /// Generate open board items for the horizon, joined with status and
    /// assignees
    async fn open_items(&self, household_id: &str, now_ms: i64) -> Result<Vec<BoardItem>> {
        let horizon = self.horizon_days(household_id).await?;
        let templates = self.repo.list_active_templates(household_id).await?;
        let entries = self
            .repo
            .list_ledger_entries(household_id, config::DEFAULT_LEDGER_WINDOW)
            .await?;
        let members = self.repo.list_members(household_id).await?;

        let occurrences = generate_occurrences(&templates, &self.cal, now_ms, horizon);
        let status = fold_status(&entries);

        let items = occurrences
            .into_iter()
            .filter(|o| is_open(&status, &o.key()))
            .filter_map(|occurrence| {
                // Template disappeared between fetches: drop the row
                let template = templates.iter().find(|t| t.id == occurrence.template_id)?;
                let assignee = resolve_assignee(template, &occurrence.day_key, &members);
                Some(BoardItem {
                    title: template.title.clone(),
                    points: template.points,
                    assignee_id: assignee.map(|m| m.id.clone()),
                    assignee_name: assignee_label(assignee),
                    occurrence,
                })
            })
            .collect();

        Ok(items)
    }

    /// Assemble the Today view
    pub async fn today_board(&self, household_id: &str, now_ms: i64) -> Result<TodayBoard> {
        let day_key = self.cal.day_key(now_ms);
        let items = self.open_items(household_id, now_ms).await?;

        let (due_today, next3): (Vec<_>, Vec<_>) = items
            .into_iter()
            .filter(|i| i.occurrence.bucket != Bucket::Later)
            .partition(|i| i.occurrence.bucket == Bucket::Today);

        let entries = self
            .repo
            .list_ledger_entries(household_id, config::DEFAULT_LEDGER_WINDOW)
            .await?;
        let completed_today: Vec<LedgerEntry> = entries
            .into_iter()
            .filter(|e| e.day_key.as_deref() == Some(day_key.as_str()) && e.delta > 0)
            .collect();
        let points_earned_today = completed_today.iter().map(|e| e.delta).sum();

        tracing::debug!(
            "Board for {}: {} due today, {} upcoming",
            household_id,
            due_today.len(),
            next3.len()
        );

        Ok(TodayBoard {
            day_key,
            due_today,
            next3,
            completed_today,
            points_earned_today,
        })
    }

    /// Assemble the Plan view: the whole horizon grouped by bucket
    pub async fn plan_board(&self, household_id: &str, now_ms: i64) -> Result<PlanBoard> {
        let items = self.open_items(household_id, now_ms).await?;

        let mut board = PlanBoard {
            today: Vec::new(),
            next3: Vec::new(),
            later: Vec::new(),
        };
        for item in items {
            match item.occurrence.bucket {
                Bucket::Today => board.today.push(item),
                Bucket::Next3 => board.next3.push(item),
                Bucket::Later => board.later.push(item),
            }
        }

        Ok(board)
    }

    /// Record a completion for an occurrence. Appends the canonical
    /// `Completed:` entry, then re-reads status: a net count above one
    /// means a concurrent writer completed the same occurrence.
    pub async fn complete(
        &self,
        household_id: &str,
        actor_id: &str,
        template_id: &str,
        day_key: &str,
    ) -> Result<CompleteOutcome> {
        let template = self.repo.get_template(household_id, template_id).await?;

        let entry = self
            .append_action(
                household_id,
                actor_id,
                &template,
                day_key,
                Reason::completed(&template.title),
                template.points,
            )
            .await?;

        // Advisory re-check after the write (at-least-once semantics)
        let entries = self
            .repo
            .list_ledger_entries(household_id, config::DEFAULT_LEDGER_WINDOW)
            .await?;
        let status = fold_status(&entries);
        let key = OccurrenceKey::new(template_id, day_key);
        let already_completed = status
            .get(&key)
            .map_or(false, |s| s.completed_count() > 1);

        if already_completed {
            tracing::warn!("Occurrence {} was completed more than once", key);
        }

        Ok(CompleteOutcome {
            entry,
            already_completed,
        })
    }

    /// Mark an occurrence skipped. Sticky: no undo path reopens it.
    pub async fn skip(
        &self,
        household_id: &str,
        actor_id: &str,
        template_id: &str,
        day_key: &str,
    ) -> Result<LedgerEntry> {
        let template = self.repo.get_template(household_id, template_id).await?;
        self.append_action(
            household_id,
            actor_id,
            &template,
            day_key,
            Reason::skipped(&template.title),
            0,
        )
        .await
    }

    /// Undo a completion: appends a compensating negative entry. The
    /// original completion stays in the ledger.
    pub async fn undo(
        &self,
        household_id: &str,
        actor_id: &str,
        template_id: &str,
        day_key: &str,
    ) -> Result<LedgerEntry> {
        let template = self.repo.get_template(household_id, template_id).await?;
        self.append_action(
            household_id,
            actor_id,
            &template,
            day_key,
            Reason::undo(&template.title),
            -template.points,
        )
        .await
    }

    async fn append_action(
        &self,
        household_id: &str,
        actor_id: &str,
        template: &ChoreTemplate,
        day_key: &str,
        reason: Reason,
        delta: i64,
    ) -> Result<LedgerEntry> {
        tracing::info!(
            "Recording '{}' for {} on {}",
            reason,
            template.id,
            day_key
        );

        self.repo
            .append_ledger_entry(
                household_id,
                NewLedgerEntry {
                    actor_id: actor_id.to_string(),
                    delta,
                    reason: reason.to_string(),
                    created_at: Utc::now(),
                    template_id: Some(template.id.clone()),
                    day_key: Some(day_key.to_string()),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{
        initialize_database, AssigneeMode, CreateTemplateRequest, Frequency, Repository,
    };
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> (BoardService<Utc>, Repository) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let repo = Repository::new(pool);
        let service = BoardService::with_calendar(repo.clone(), Calendar::new(Utc));
        (service, repo)
    }

    fn daily(title: &str, points: i64) -> CreateTemplateRequest {
        CreateTemplateRequest {
            title: title.to_string(),
            points,
            frequency: Frequency::Daily,
            assignee_mode: AssigneeMode::Anyone,
            fixed_assignee_id: None,
            schedule: None,
        }
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    #[tokio::test]
    async fn test_board_lists_open_occurrences() {
        let (service, repo) = create_test_service().await;

        repo.create_template("h1", daily("Dishes", 10)).await.unwrap();
        repo.create_template("h1", daily("Sweep", 5)).await.unwrap();

        let board = service.today_board("h1", now_ms()).await.unwrap();

        assert_eq!(board.due_today.len(), 2);
        // Daily chores fill the next three days too
        assert_eq!(board.next3.len(), 6);
        assert!(board.completed_today.is_empty());
        assert_eq!(board.points_earned_today, 0);
    }

    #[tokio::test]
    async fn test_complete_resolves_occurrence() {
        let (service, repo) = create_test_service().await;

        let template = repo.create_template("h1", daily("Dishes", 10)).await.unwrap();

        let board = service.today_board("h1", now_ms()).await.unwrap();
        let day_key = board.due_today[0].occurrence.day_key.clone();

        let outcome = service
            .complete("h1", "u1", &template.id, &day_key)
            .await
            .unwrap();
        assert!(!outcome.already_completed);
        assert_eq!(outcome.entry.delta, 10);
        assert_eq!(outcome.entry.reason, "Completed: Dishes");

        let board = service.today_board("h1", now_ms()).await.unwrap();
        assert!(board.due_today.is_empty());
        assert_eq!(board.completed_today.len(), 1);
        assert_eq!(board.points_earned_today, 10);
    }

    #[tokio::test]
    async fn test_double_complete_is_reported_not_rejected() {
        let (service, repo) = create_test_service().await;

        let template = repo.create_template("h1", daily("Dishes", 10)).await.unwrap();
        let day_key = service.today_board("h1", now_ms()).await.unwrap().due_today[0]
            .occurrence
            .day_key
            .clone();

        let first = service.complete("h1", "u1", &template.id, &day_key).await.unwrap();
        let second = service.complete("h1", "u2", &template.id, &day_key).await.unwrap();

        assert!(!first.already_completed);
        assert!(second.already_completed);

        // Both entries are in the ledger; nothing was rolled back
        let entries = repo.list_ledger_entries("h1", 100).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_undo_reopens_occurrence() {
        let (service, repo) = create_test_service().await;

        let template = repo.create_template("h1", daily("Dishes", 10)).await.unwrap();
        let day_key = service.today_board("h1", now_ms()).await.unwrap().due_today[0]
            .occurrence
            .day_key
            .clone();

        service.complete("h1", "u1", &template.id, &day_key).await.unwrap();
        let undo = service.undo("h1", "u1", &template.id, &day_key).await.unwrap();
        assert_eq!(undo.delta, -10);
        assert_eq!(undo.reason, "Undo: Dishes");

        let board = service.today_board("h1", now_ms()).await.unwrap();
        assert_eq!(board.due_today.len(), 1);
    }

    #[tokio::test]
    async fn test_skip_excludes_from_open_views() {
        let (service, repo) = create_test_service().await;

        let template = repo.create_template("h1", daily("Dishes", 10)).await.unwrap();
        let day_key = service.today_board("h1", now_ms()).await.unwrap().due_today[0]
            .occurrence
            .day_key
            .clone();

        let skip = service.skip("h1", "u1", &template.id, &day_key).await.unwrap();
        assert_eq!(skip.delta, 0);

        let board = service.today_board("h1", now_ms()).await.unwrap();
        assert!(board.due_today.is_empty());
        // A skip earns nothing
        assert_eq!(board.points_earned_today, 0);
    }

    #[tokio::test]
    async fn test_plan_board_groups_by_bucket() {
        let (service, repo) = create_test_service().await;

        repo.create_template("h1", daily("Dishes", 10)).await.unwrap();

        let board = service.plan_board("h1", now_ms()).await.unwrap();
        assert_eq!(board.today.len(), 1);
        assert_eq!(board.next3.len(), 3);
        // Default horizon 10: days 4..=10
        assert_eq!(board.later.len(), 7);
    }

    #[tokio::test]
    async fn test_horizon_setting_is_respected() {
        let (service, repo) = create_test_service().await;

        repo.create_template("h1", daily("Dishes", 10)).await.unwrap();
        repo.set_setting("h1:horizon_days", "3").await.unwrap();

        let board = service.plan_board("h1", now_ms()).await.unwrap();
        assert!(board.later.is_empty());
        assert_eq!(board.next3.len(), 3);
    }

    #[tokio::test]
    async fn test_rotating_assignee_appears_on_board() {
        let (service, repo) = create_test_service().await;

        let mut req = daily("Dishes", 10);
        req.assignee_mode = AssigneeMode::Rotating;
        repo.create_template("h1", req).await.unwrap();
        repo.add_member("h1", "u1", "Alex").await.unwrap();
        repo.add_member("h1", "u2", "Sam").await.unwrap();

        let board = service.today_board("h1", now_ms()).await.unwrap();
        let item = &board.due_today[0];

        assert!(item.assignee_id.is_some());
        assert!(!item.assignee_name.is_empty());

        // Consecutive days alternate between the two members
        let tomorrow = &board.next3[0];
        assert_ne!(item.assignee_id, tomorrow.assignee_id);
    }
}
