use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

/// A normalized inbound chat message, produced by the transport layer.
///
/// Platform payload shapes (Twilio form fields, Telegram JSON) are flattened
/// into this one record before the state machine sees them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Channel-assigned message id (e.g. Twilio MessageSid).
    pub channel_message_id: String,
    /// Address the message came from, e.g. "whatsapp:+15551234567".
    pub sender_address: String,
    /// Our address the message was sent to.
    pub recipient_address: String,
    /// Sender profile name, when the channel reports one.
    pub sender_display_name: Option<String>,
    /// Raw message text.
    pub body_text: String,
}

impl InboundMessage {
    /// Reject malformed payloads before any state transition happens.
    ///
    /// Message id, sender address, and body are required; the display name
    /// is not.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.channel_message_id.trim().is_empty() {
            return Err(PayloadError::MissingMessageId);
        }
        if self.sender_address.trim().is_empty() {
            return Err(PayloadError::MissingSender);
        }
        if self.body_text.trim().is_empty() {
            return Err(PayloadError::MissingBody);
        }
        Ok(())
    }
}
