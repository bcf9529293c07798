//! SQLite project repository implementation.

use siteforge_core::repository::project::ProjectRepository;
use siteforge_types::error::RepositoryError;
use siteforge_types::project::{Project, ProjectId};
use siteforge_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ProjectRepository`.
pub struct SqliteProjectRepository {
    pool: DatabasePool,
}

impl SqliteProjectRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ProjectRow {
    id: String,
    user_id: String,
    name: String,
    last_ai_summary: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ProjectRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            last_ai_summary: row.try_get("last_ai_summary")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_project(self) -> Result<Project, RepositoryError> {
        let id = self
            .id
            .parse::<ProjectId>()
            .map_err(|e| RepositoryError::Query(format!("invalid project id: {e}")))?;
        let user_id = self
            .user_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;

        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(Project {
            id,
            user_id,
            name: self.name,
            last_ai_summary: self.last_ai_summary,
            created_at,
            updated_at,
        })
    }
}

impl ProjectRepository for SqliteProjectRepository {
    async fn create(&self, project: &Project) -> Result<Project, RepositoryError> {
        sqlx::query(
            "INSERT INTO projects (id, user_id, name, last_ai_summary, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(project.id.to_string())
        .bind(project.user_id.to_string())
        .bind(&project.name)
        .bind(&project.last_ai_summary)
        .bind(format_datetime(&project.created_at))
        .bind(format_datetime(&project.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(project.clone())
    }

    async fn get_by_id(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let project_row = ProjectRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(project_row.into_project()?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Project>, RepositoryError> {
        // The resume menu is built from this ordering; id is the tiebreaker
        // because UUID v7 sorts by creation time.
        let rows = sqlx::query(
            "SELECT * FROM projects WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                ProjectRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_project()
            })
            .collect()
    }

    async fn update_summary(&self, id: &ProjectId, summary: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE projects SET last_ai_summary = ?, updated_at = ? WHERE id = ?",
        )
        .bind(summary)
        .bind(format_datetime(&chrono::Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
