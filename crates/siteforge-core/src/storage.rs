//! SiteStore trait definition.

use siteforge_types::error::StorageError;

/// Trait for object storage holding packaged site archives.
///
/// Implementations live in siteforge-infra (e.g., `SupabaseStorage`).
pub trait SiteStore: Send + Sync {
    /// Upload an archive under the given object key and return its public URL.
    fn upload(
        &self,
        object_key: &str,
        bytes: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<String, StorageError>> + Send;
}
