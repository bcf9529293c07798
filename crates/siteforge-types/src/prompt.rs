use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::project::ProjectId;
use crate::user::UserId;

/// Unique identifier for a stored prompt, wrapping a UUID v7.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromptId(pub Uuid);

impl PromptId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PromptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PromptId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One generation request recorded against a project.
///
/// Append-only: rows are written once per handled inbound message while a
/// project is active and never mutated. `message_id` is the channel message
/// id, kept for idempotency audits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: PromptId,
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub message_id: String,
    pub prompt_text: String,
    pub model_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PromptRecord {
    pub fn new(
        user_id: UserId,
        project_id: ProjectId,
        message_id: &str,
        prompt_text: &str,
        model_response: Option<String>,
    ) -> Self {
        Self {
            id: PromptId::new(),
            user_id,
            project_id,
            message_id: message_id.to_string(),
            prompt_text: prompt_text.to_string(),
            model_response,
            created_at: Utc::now(),
        }
    }
}
