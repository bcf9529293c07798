//! SiteGenerator trait definition.
//!
//! This is the abstraction over the generative code service. The state
//! machine hands it a fully rendered prompt and gets back raw response text;
//! bounding the call with a timeout is the caller's job.

use siteforge_types::error::GenerationError;

/// Trait for generative text backends (Gemini, etc.).
///
/// Implementations live in siteforge-infra (e.g., `GeminiClient`).
pub trait SiteGenerator: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and receive the full response text.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}
