//! User repository trait definition.

use siteforge_types::error::RepositoryError;
use siteforge_types::user::{ConversationState, Platform, User, UserId};

/// Repository trait for user persistence.
///
/// Implementations live in siteforge-infra (e.g., SqliteUserRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait UserRepository: Send + Sync {
    /// Look up a user by channel identity. Returns `None` for unknown senders.
    fn find_by_address(
        &self,
        platform: Platform,
        phone_number: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Create a new user. Returns the created user.
    fn create(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Overwrite a user's conversation state (last writer wins).
    fn update_state(
        &self,
        id: &UserId,
        state: Option<&ConversationState>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
