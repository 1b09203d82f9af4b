//! Repository layer for database operations
//!
//! Provides the storage collaborators the scheduling core consumes:
//! template CRUD, the append-only ledger, household membership, and a
//! small key-value settings store. Ledger entries are only ever inserted.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Chore templates =====

    /// Create a new chore template
    pub async fn create_template(
        &self,
        household_id: &str,
        req: CreateTemplateRequest,
    ) -> Result<ChoreTemplate> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let schedule_json = schedule_to_json(req.schedule)?;

        let template = sqlx::query_as::<_, ChoreTemplate>(
            r#"
            INSERT INTO chore_templates
                (id, household_id, title, points, frequency, assignee_mode,
                 fixed_assignee_id, active, schedule_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(household_id)
        .bind(&req.title)
        .bind(req.points)
        .bind(req.frequency)
        .bind(req.assignee_mode)
        .bind(&req.fixed_assignee_id)
        .bind(&schedule_json)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created template: {}", id);
        Ok(template)
    }

    /// Get a template by ID
    pub async fn get_template(&self, household_id: &str, id: &str) -> Result<ChoreTemplate> {
        let template = sqlx::query_as::<_, ChoreTemplate>(
            r#"
            SELECT * FROM chore_templates WHERE household_id = ? AND id = ?
            "#,
        )
        .bind(household_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::TemplateNotFound(id.to_string()))?;

        Ok(template)
    }

    /// List all templates for a household, most recently edited first
    pub async fn list_templates(&self, household_id: &str) -> Result<Vec<ChoreTemplate>> {
        let templates = sqlx::query_as::<_, ChoreTemplate>(
            r#"
            SELECT * FROM chore_templates
            WHERE household_id = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(household_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// List active templates only (the occurrence generator's input)
    pub async fn list_active_templates(&self, household_id: &str) -> Result<Vec<ChoreTemplate>> {
        let templates = sqlx::query_as::<_, ChoreTemplate>(
            r#"
            SELECT * FROM chore_templates
            WHERE household_id = ? AND active = 1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(household_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// Update a template; unset request fields are left unchanged
    pub async fn update_template(
        &self,
        household_id: &str,
        id: &str,
        req: UpdateTemplateRequest,
    ) -> Result<ChoreTemplate> {
        // Read-modify-write keeps the query static; template edits are
        // rare and never contended within one household session.
        let current = self.get_template(household_id, id).await?;

        let schedule_json = match req.schedule {
            Some(schedule) => schedule_to_json(Some(schedule))?,
            None => current.schedule_json.clone(),
        };

        let template = sqlx::query_as::<_, ChoreTemplate>(
            r#"
            UPDATE chore_templates
            SET title = ?, points = ?, frequency = ?, assignee_mode = ?,
                fixed_assignee_id = ?, active = ?, schedule_json = ?, updated_at = ?
            WHERE household_id = ? AND id = ?
            RETURNING *
            "#,
        )
        .bind(req.title.unwrap_or(current.title))
        .bind(req.points.unwrap_or(current.points))
        .bind(req.frequency.unwrap_or(current.frequency))
        .bind(req.assignee_mode.unwrap_or(current.assignee_mode))
        .bind(req.fixed_assignee_id.or(current.fixed_assignee_id))
        .bind(req.active.unwrap_or(current.active))
        .bind(&schedule_json)
        .bind(Utc::now())
        .bind(household_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Updated template: {}", id);
        Ok(template)
    }

    /// Delete a template. Its ledger entries stay; history keeps its
    /// points even when the chore definition goes away.
    pub async fn delete_template(&self, household_id: &str, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM chore_templates WHERE household_id = ? AND id = ?")
            .bind(household_id)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TemplateNotFound(id.to_string()));
        }

        tracing::debug!("Deleted template: {}", id);
        Ok(())
    }

    // ===== Ledger (append-only) =====

    /// Append a ledger entry. The single write path into the ledger:
    /// entries are never updated or deleted.
    pub async fn append_ledger_entry(
        &self,
        household_id: &str,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry> {
        let id = Uuid::new_v4().to_string();

        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries
                (id, household_id, actor_id, delta, reason, created_at, template_id, day_key)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(household_id)
        .bind(&entry.actor_id)
        .bind(entry.delta)
        .bind(&entry.reason)
        .bind(entry.created_at)
        .bind(&entry.template_id)
        .bind(&entry.day_key)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Appended ledger entry: {} ({})", id, entry.reason);
        Ok(entry)
    }

    /// List the most recent ledger entries, newest first.
    ///
    /// Callers must not rely on this order for status folding; the
    /// reducer is order-independent by construction.
    pub async fn list_ledger_entries(
        &self,
        household_id: &str,
        max: u32,
    ) -> Result<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM ledger_entries
            WHERE household_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(household_id)
        .bind(max)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// List ledger entries with `start_ms <= created_at < end_ms`
    pub async fn list_ledger_entries_in_range(
        &self,
        household_id: &str,
        start_ms: i64,
        end_ms: i64,
        max: u32,
    ) -> Result<Vec<LedgerEntry>> {
        let start = ms_to_datetime(start_ms);
        let end = ms_to_datetime(end_ms);

        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM ledger_entries
            WHERE household_id = ? AND created_at >= ? AND created_at < ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(household_id)
        .bind(start)
        .bind(end)
        .bind(max)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    // ===== Household members =====

    /// Add a member to a household
    pub async fn add_member(&self, household_id: &str, id: &str, name: &str) -> Result<Member> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO household_members (id, household_id, name, joined_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(household_id)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Added member {} to household {}", id, household_id);
        Ok(member)
    }

    /// List household members ordered by name.
    ///
    /// The ordering is significant: rotation indexes into this list, so
    /// it must be stable across devices for assignments to agree.
    pub async fn list_members(&self, household_id: &str) -> Result<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT * FROM household_members
            WHERE household_id = ?
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(household_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    // ===== Settings =====

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Set setting: {} = {}", key, value);
        Ok(())
    }
}

fn schedule_to_json(schedule: Option<Schedule>) -> Result<Option<String>> {
    schedule
        .map(|s| serde_json::to_string(&s.clamped()).map_err(AppError::from))
        .transpose()
}

fn ms_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_repo() -> Repository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        Repository::new(pool)
    }

    fn dishes_request() -> CreateTemplateRequest {
        CreateTemplateRequest {
            title: "Dishes".to_string(),
            points: 10,
            frequency: Frequency::Daily,
            assignee_mode: AssigneeMode::Anyone,
            fixed_assignee_id: None,
            schedule: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_template() {
        let repo = create_test_repo().await;

        let template = repo.create_template("h1", dishes_request()).await.unwrap();
        assert_eq!(template.title, "Dishes");
        assert!(template.active);

        let fetched = repo.get_template("h1", &template.id).await.unwrap();
        assert_eq!(fetched.id, template.id);
        assert_eq!(fetched.frequency, Frequency::Daily);
    }

    #[tokio::test]
    async fn test_template_is_household_scoped() {
        let repo = create_test_repo().await;

        let template = repo.create_template("h1", dishes_request()).await.unwrap();

        let result = repo.get_template("other", &template.id).await;
        assert!(matches!(result, Err(AppError::TemplateNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_template_partial() {
        let repo = create_test_repo().await;

        let template = repo.create_template("h1", dishes_request()).await.unwrap();

        let updated = repo
            .update_template(
                "h1",
                &template.id,
                UpdateTemplateRequest {
                    points: Some(20),
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.points, 20);
        assert!(!updated.active);
        // Untouched fields survive
        assert_eq!(updated.title, "Dishes");
        assert_eq!(updated.frequency, Frequency::Daily);
    }

    #[tokio::test]
    async fn test_inactive_templates_are_not_listed_as_active() {
        let repo = create_test_repo().await;

        let template = repo.create_template("h1", dishes_request()).await.unwrap();
        repo.create_template("h1", dishes_request()).await.unwrap();

        repo.update_template(
            "h1",
            &template.id,
            UpdateTemplateRequest {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(repo.list_templates("h1").await.unwrap().len(), 2);
        assert_eq!(repo.list_active_templates("h1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_schedule_is_clamped_on_write() {
        let repo = create_test_repo().await;

        let mut req = dishes_request();
        req.frequency = Frequency::Weekly;
        req.schedule = Some(Schedule {
            week_day: Some(9),
            ..Default::default()
        });

        let template = repo.create_template("h1", req).await.unwrap();
        assert_eq!(template.schedule().unwrap().week_day, Some(6));
    }

    #[tokio::test]
    async fn test_ledger_append_and_list() {
        let repo = create_test_repo().await;

        for i in 0..3 {
            repo.append_ledger_entry(
                "h1",
                NewLedgerEntry {
                    actor_id: "u1".to_string(),
                    delta: 10,
                    reason: format!("Completed: Chore {}", i),
                    created_at: Utc::now(),
                    template_id: Some("t1".to_string()),
                    day_key: Some("2025-06-01".to_string()),
                },
            )
            .await
            .unwrap();
        }

        let entries = repo.list_ledger_entries("h1", 500).await.unwrap();
        assert_eq!(entries.len(), 3);

        // Window limit applies
        let entries = repo.list_ledger_entries("h1", 2).await.unwrap();
        assert_eq!(entries.len(), 2);

        // Other households see nothing
        let entries = repo.list_ledger_entries("other", 500).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_ledger_range_query_is_half_open() {
        let repo = create_test_repo().await;

        let base = Utc::now();
        for offset_days in [0i64, 1, 2] {
            repo.append_ledger_entry(
                "h1",
                NewLedgerEntry {
                    actor_id: "u1".to_string(),
                    delta: 5,
                    reason: "Completed: Dishes".to_string(),
                    created_at: base + chrono::Duration::days(offset_days),
                    template_id: None,
                    day_key: None,
                },
            )
            .await
            .unwrap();
        }

        let start = base.timestamp_millis();
        let end = (base + chrono::Duration::days(2)).timestamp_millis();

        let entries = repo
            .list_ledger_entries_in_range("h1", start, end, 100)
            .await
            .unwrap();

        // Day 0 and day 1 are in range; day 2 is exactly at the open end
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_members_ordered_by_name() {
        let repo = create_test_repo().await;

        repo.add_member("h1", "u2", "Sam").await.unwrap();
        repo.add_member("h1", "u1", "Alex").await.unwrap();
        repo.add_member("h2", "u3", "Noa").await.unwrap();

        let members = repo.list_members("h1").await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "Alex");
        assert_eq!(members[1].name, "Sam");
    }

    #[tokio::test]
    async fn test_settings() {
        let repo = create_test_repo().await;

        repo.set_setting("h1:horizon_days", "14").await.unwrap();

        let value = repo.get_setting("h1:horizon_days").await.unwrap();
        assert_eq!(value, Some("14".to_string()));

        repo.set_setting("h1:horizon_days", "7").await.unwrap();

        let updated = repo.get_setting("h1:horizon_days").await.unwrap();
        assert_eq!(updated, Some("7".to_string()));
    }
}
