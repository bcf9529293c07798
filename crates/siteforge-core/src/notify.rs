//! Notification dispatcher.
//!
//! Outbound messages are best-effort relative to the state transitions that
//! produced them: a send failure is logged and swallowed, never allowed to
//! roll back already-persisted records. Ordering is the caller's sequencing
//! of `notify` calls -- the dispatcher awaits each send before returning, so
//! a "working on it" notice always reaches the channel before the terminal
//! status message that follows it.

use crate::outbound::MessageSender;

/// Sequences outbound messages over a [`MessageSender`].
pub struct Notifier<S: MessageSender> {
    sender: S,
}

impl<S: MessageSender> Notifier<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    /// Send one message. Returns whether the send succeeded; failures are
    /// logged and otherwise non-fatal.
    pub async fn notify(&self, from_address: &str, to_address: &str, text: &str) -> bool {
        match self.sender.send(from_address, to_address, text).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    to = %to_address,
                    "outbound notification failed"
                );
                false
            }
        }
    }
}
