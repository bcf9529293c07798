//! WhatsApp webhook receiver.
//!
//! Flattens the Twilio form payload into the normalized inbound record and
//! runs one conversation turn inline. The turn handler owns all error
//! handling, so this handler is infallible: the response is always a JSON
//! acknowledgement with the turn's success flag.

use axum::extract::{Form, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use siteforge_core::conversation::TurnOutcome;
use siteforge_types::message::InboundMessage;

use crate::state::AppState;

/// Twilio webhook form fields. Older API versions send `SmsMessageSid`
/// instead of `MessageSid`; both are accepted.
#[derive(Debug, Deserialize)]
pub struct TwilioInbound {
    #[serde(rename = "MessageSid", alias = "SmsMessageSid")]
    pub message_sid: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "ProfileName")]
    pub profile_name: Option<String>,
}

/// Acknowledgement returned to the webhook caller.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// POST /webhooks/whatsapp - handle one inbound WhatsApp message.
pub async fn receive_whatsapp(
    State(state): State<AppState>,
    Form(payload): Form<TwilioInbound>,
) -> Json<WebhookAck> {
    let inbound = normalize(payload, &state.from_address);

    let outcome = state.conversation.handle_turn(&inbound).await;

    let (ok, reason) = match outcome {
        TurnOutcome::Completed => (true, None),
        TurnOutcome::Failed => (false, Some("turn failed")),
        TurnOutcome::Rejected => (false, Some("invalid payload")),
    };
    Json(WebhookAck { ok, reason })
}

/// Flatten the platform payload into the one normalized record the state
/// machine consumes. Missing required fields become empty strings here and
/// are rejected by the turn handler's payload validation.
fn normalize(payload: TwilioInbound, default_recipient: &str) -> InboundMessage {
    InboundMessage {
        channel_message_id: payload.message_sid.unwrap_or_default(),
        sender_address: payload.from.unwrap_or_default(),
        recipient_address: payload
            .to
            .unwrap_or_else(|| default_recipient.to_string()),
        sender_display_name: payload.profile_name,
        body_text: payload.body.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> TwilioInbound {
        TwilioInbound {
            message_sid: Some("SM1".to_string()),
            from: Some("whatsapp:+1555".to_string()),
            to: Some("whatsapp:+1456".to_string()),
            body: Some("menu".to_string()),
            profile_name: Some("Ada".to_string()),
        }
    }

    #[test]
    fn test_normalize_maps_all_fields() {
        let inbound = normalize(payload(), "whatsapp:+1000");

        assert_eq!(inbound.channel_message_id, "SM1");
        assert_eq!(inbound.sender_address, "whatsapp:+1555");
        assert_eq!(inbound.recipient_address, "whatsapp:+1456");
        assert_eq!(inbound.sender_display_name.as_deref(), Some("Ada"));
        assert_eq!(inbound.body_text, "menu");
        assert!(inbound.validate().is_ok());
    }

    #[test]
    fn test_normalize_falls_back_to_configured_recipient() {
        let mut p = payload();
        p.to = None;
        let inbound = normalize(p, "whatsapp:+1000");
        assert_eq!(inbound.recipient_address, "whatsapp:+1000");
    }

    #[test]
    fn test_missing_required_fields_fail_validation() {
        let mut p = payload();
        p.body = None;
        assert!(normalize(p, "whatsapp:+1000").validate().is_err());

        let mut p = payload();
        p.message_sid = None;
        assert!(normalize(p, "whatsapp:+1000").validate().is_err());
    }

    #[test]
    fn test_legacy_sms_message_sid_accepted() {
        let payload: TwilioInbound = serde_json::from_value(serde_json::json!({
            "SmsMessageSid": "SM9",
            "From": "whatsapp:+1555",
            "To": "whatsapp:+1456",
            "Body": "hi"
        }))
        .unwrap();
        assert_eq!(payload.message_sid.as_deref(), Some("SM9"));
    }
}
