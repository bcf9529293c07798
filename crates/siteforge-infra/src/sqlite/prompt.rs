//! SQLite prompt repository implementation.
//!
//! The prompt log is append-only, so this repository only knows how to
//! insert.

use siteforge_core::repository::prompt::PromptRepository;
use siteforge_types::error::RepositoryError;
use siteforge_types::prompt::PromptRecord;

use super::format_datetime;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `PromptRepository`.
pub struct SqlitePromptRepository {
    pool: DatabasePool,
}

impl SqlitePromptRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl PromptRepository for SqlitePromptRepository {
    async fn create(&self, record: &PromptRecord) -> Result<PromptRecord, RepositoryError> {
        sqlx::query(
            "INSERT INTO prompts (id, user_id, project_id, message_id, prompt_text, model_response, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.project_id.to_string())
        .bind(&record.message_id)
        .bind(&record.prompt_text)
        .bind(&record.model_response)
        .bind(format_datetime(&record.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(record.clone())
    }
}
