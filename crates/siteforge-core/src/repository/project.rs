//! Project repository trait definition.

use siteforge_types::error::RepositoryError;
use siteforge_types::project::{Project, ProjectId};
use siteforge_types::user::UserId;

/// Repository trait for project persistence.
pub trait ProjectRepository: Send + Sync {
    /// Create a new project. Returns the created project.
    fn create(
        &self,
        project: &Project,
    ) -> impl std::future::Future<Output = Result<Project, RepositoryError>> + Send;

    /// Get a project by its unique ID.
    fn get_by_id(
        &self,
        id: &ProjectId,
    ) -> impl std::future::Future<Output = Result<Option<Project>, RepositoryError>> + Send;

    /// List a user's projects, most recently created first. This ordering is
    /// what the numbered resume menu is built from, so it must be stable.
    fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Project>, RepositoryError>> + Send;

    /// Replace a project's carried-forward generation context.
    fn update_summary(
        &self,
        id: &ProjectId,
        summary: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
