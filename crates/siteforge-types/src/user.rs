use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::project::ProjectId;

/// Unique identifier for a user, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new UserId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a UserId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Chat platform a user reaches us on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Whatsapp,
    Telegram,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Whatsapp => write!(f, "whatsapp"),
            Platform::Telegram => write!(f, "telegram"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whatsapp" => Ok(Platform::Whatsapp),
            "telegram" => Ok(Platform::Telegram),
            other => Err(format!("invalid platform: '{other}'")),
        }
    }
}

/// Where a user is in the project conversation.
///
/// `ActiveProject` carries the project the user is currently directing
/// generation prompts toward. The storage layer persists this as a single
/// text column (`active_project:<uuid>`); the string form exists only at
/// that boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationState {
    /// The next message names a new project.
    WaitingForProjectName,
    /// The next message picks a menu option (1 = new, 2 = resume).
    WaitingForOption,
    /// The next message picks a project by 1-based list index.
    WaitingForProjectSelection,
    /// Free text is forwarded to generation for this project.
    ActiveProject(ProjectId),
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationState::WaitingForProjectName => write!(f, "waiting_for_project_name"),
            ConversationState::WaitingForOption => write!(f, "waiting_for_option"),
            ConversationState::WaitingForProjectSelection => {
                write!(f, "waiting_for_project_selection")
            }
            ConversationState::ActiveProject(id) => write!(f, "active_project:{id}"),
        }
    }
}

impl FromStr for ConversationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(raw_id) = s.strip_prefix("active_project:") {
            let id = raw_id
                .parse::<ProjectId>()
                .map_err(|e| format!("invalid project id in state: {e}"))?;
            return Ok(ConversationState::ActiveProject(id));
        }

        match s {
            "waiting_for_project_name" => Ok(ConversationState::WaitingForProjectName),
            "waiting_for_option" => Ok(ConversationState::WaitingForOption),
            "waiting_for_project_selection" => Ok(ConversationState::WaitingForProjectSelection),
            other => Err(format!("invalid conversation state: '{other}'")),
        }
    }
}

/// A registered end user, unique per (platform, phone number).
///
/// Created on the first inbound message from an unknown address, already in
/// `WaitingForProjectName`. The state machine mutates `state` on every turn;
/// users are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Channel address, e.g. "whatsapp:+15551234567".
    pub phone_number: String,
    pub platform: Platform,
    /// Display name reported by the channel, when available.
    pub display_name: Option<String>,
    /// `None` means the stored state was absent or unreadable; the state
    /// machine treats that as "show the menu".
    pub state: Option<ConversationState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly registered user in `WaitingForProjectName`.
    pub fn register(platform: Platform, phone_number: &str, display_name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            phone_number: phone_number.to_string(),
            platform,
            display_name: display_name.map(str::to_string),
            state: Some(ConversationState::WaitingForProjectName),
            created_at: now,
            updated_at: now,
        }
    }
}
