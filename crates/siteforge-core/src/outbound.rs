//! MessageSender trait definition.

use siteforge_types::error::SendError;

/// Trait for the outbound message-sending channel.
///
/// Fire-and-forget from the state machine's perspective, but implementations
/// must report transport failures so the notification dispatcher can log
/// them. Implementations live in siteforge-infra (e.g., `TwilioSender`).
pub trait MessageSender: Send + Sync {
    /// Send one text message from our address to a user's address.
    fn send(
        &self,
        from_address: &str,
        to_address: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), SendError>> + Send;
}
