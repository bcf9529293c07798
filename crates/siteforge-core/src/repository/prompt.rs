//! Prompt repository trait definition.

use siteforge_types::error::RepositoryError;
use siteforge_types::prompt::PromptRecord;

/// Repository trait for the append-only prompt log.
pub trait PromptRepository: Send + Sync {
    /// Append one prompt record. Records are never updated or deleted.
    fn create(
        &self,
        record: &PromptRecord,
    ) -> impl std::future::Future<Output = Result<PromptRecord, RepositoryError>> + Send;
}
