//! Error types for the chorequest engine
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to a host UI as plain strings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Chore template not found: {0}")]
    TemplateNotFound(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
