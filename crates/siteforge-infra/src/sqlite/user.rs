//! SQLite user repository implementation.
//!
//! Implements `UserRepository` from `siteforge-core` using sqlx with split
//! read/write pools. The conversation state is persisted as one text column;
//! a stored value that no longer parses is surfaced as `None` rather than an
//! error, which the state machine answers with the menu.

use siteforge_core::repository::user::UserRepository;
use siteforge_types::error::RepositoryError;
use siteforge_types::user::{ConversationState, Platform, User, UserId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain User.
struct UserRow {
    id: String,
    phone_number: String,
    platform: String,
    display_name: Option<String>,
    state: Option<String>,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            phone_number: row.try_get("phone_number")?,
            platform: row.try_get("platform")?,
            display_name: row.try_get("display_name")?,
            state: row.try_get("state")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = self
            .id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;

        let platform: Platform = self
            .platform
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        // Unreadable stored state degrades to "no state" instead of failing
        // the whole turn.
        let state = match self.state.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<ConversationState>() {
                Ok(state) => Some(state),
                Err(err) => {
                    tracing::warn!(user = %self.id, error = %err, "dropping unreadable state");
                    None
                }
            },
        };

        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(User {
            id,
            phone_number: self.phone_number,
            platform,
            display_name: self.display_name,
            state,
            created_at,
            updated_at,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    async fn find_by_address(
        &self,
        platform: Platform,
        phone_number: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE platform = ? AND phone_number = ?")
            .bind(platform.to_string())
            .bind(phone_number)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (id, phone_number, platform, display_name, state, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.phone_number)
        .bind(user.platform.to_string())
        .bind(&user.display_name)
        .bind(user.state.as_ref().map(|s| s.to_string()))
        .bind(format_datetime(&user.created_at))
        .bind(format_datetime(&user.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(user.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict(format!(
                    "user already exists for {} on {}",
                    user.phone_number, user.platform
                )))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn update_state(
        &self,
        id: &UserId,
        state: Option<&ConversationState>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET state = ?, updated_at = ? WHERE id = ?")
            .bind(state.map(|s| s.to_string()))
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
