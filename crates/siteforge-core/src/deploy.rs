//! DeployTrigger trait definition.

use siteforge_types::error::DeployError;
use siteforge_types::site::{DeployRequest, DeployStatus};

/// Trait for the static-hosting deploy trigger.
///
/// Implementations live in siteforge-infra (e.g., `VercelDeploy`).
pub trait DeployTrigger: Send + Sync {
    /// Ask the host to publish the most recently uploaded archive for this
    /// project. The returned status must carry at least a `status` field.
    fn deploy(
        &self,
        request: &DeployRequest,
    ) -> impl std::future::Future<Output = Result<DeployStatus, DeployError>> + Send;
}
