//! Chore template service
//!
//! High-level template management with validation. Schedule overrides
//! are validated here (and clamped again at the repository) so the
//! occurrence generator can always assume in-range input.

use crate::config;
use crate::database::{
    AssigneeMode, ChoreTemplate, CreateTemplateRequest, Repository, UpdateTemplateRequest,
};
use crate::error::{AppError, Result};

/// Service for managing chore templates
#[derive(Clone)]
pub struct ChoresService {
    repo: Repository,
}

impl ChoresService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a new chore template
    pub async fn create_template(
        &self,
        household_id: &str,
        req: CreateTemplateRequest,
    ) -> Result<ChoreTemplate> {
        validate_title(&req.title)?;
        validate_points(req.points)?;
        if req.assignee_mode == AssigneeMode::Fixed && req.fixed_assignee_id.is_none() {
            return Err(AppError::InvalidTemplate(
                "fixed assignee mode requires a member".to_string(),
            ));
        }

        tracing::info!("Creating chore template: {}", req.title);
        let template = self.repo.create_template(household_id, req).await?;
        tracing::info!("Template created successfully: {}", template.id);

        Ok(template)
    }

    /// Get a template by ID
    pub async fn get_template(&self, household_id: &str, id: &str) -> Result<ChoreTemplate> {
        self.repo.get_template(household_id, id).await
    }

    /// List all templates for a household
    pub async fn list_templates(&self, household_id: &str) -> Result<Vec<ChoreTemplate>> {
        self.repo.list_templates(household_id).await
    }

    /// Update a template.
    ///
    /// Takes effect immediately for future generation and retroactively
    /// re-labels past occurrences; no as-scheduled history is kept.
    pub async fn update_template(
        &self,
        household_id: &str,
        id: &str,
        req: UpdateTemplateRequest,
    ) -> Result<ChoreTemplate> {
        if let Some(title) = &req.title {
            validate_title(title)?;
        }
        if let Some(points) = req.points {
            validate_points(points)?;
        }

        tracing::debug!("Updating template: {}", id);
        self.repo.update_template(household_id, id, req).await
    }

    /// Deactivate a template: it stops producing occurrences but keeps
    /// its history
    pub async fn deactivate_template(&self, household_id: &str, id: &str) -> Result<ChoreTemplate> {
        self.update_template(
            household_id,
            id,
            UpdateTemplateRequest {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a template permanently
    pub async fn delete_template(&self, household_id: &str, id: &str) -> Result<()> {
        tracing::info!("Deleting template: {}", id);
        self.repo.delete_template(household_id, id).await
    }
}

fn validate_title(title: &str) -> Result<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidTemplate("title must not be empty".to_string()));
    }
    if trimmed.len() > config::MAX_TITLE_LENGTH {
        return Err(AppError::InvalidTemplate(format!(
            "title exceeds {} characters",
            config::MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn validate_points(points: i64) -> Result<()> {
    if !(config::MIN_TEMPLATE_POINTS..=config::MAX_TEMPLATE_POINTS).contains(&points) {
        return Err(AppError::InvalidTemplate(format!(
            "points must be between {} and {}",
            config::MIN_TEMPLATE_POINTS,
            config::MAX_TEMPLATE_POINTS
        )));
    }
    Ok(())
}
