//! TwilioSender -- concrete [`MessageSender`] implementation for WhatsApp
//! via the Twilio Messages API.
//!
//! Addresses are passed through untouched; the caller supplies them already
//! in Twilio's `whatsapp:+<number>` form. The auth token is wrapped in
//! [`secrecy::SecretString`].

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use siteforge_core::outbound::MessageSender;
use siteforge_types::error::SendError;

/// Twilio-backed WhatsApp message sender.
pub struct TwilioSender {
    client: reqwest::Client,
    account_sid: String,
    auth_token: SecretString,
    base_url: String,
}

impl TwilioSender {
    /// Create a new sender for one Twilio account.
    pub fn new(account_sid: String, auth_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            account_sid,
            auth_token,
            base_url: "https://api.twilio.com".to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

impl MessageSender for TwilioSender {
    async fn send(
        &self,
        from_address: &str,
        to_address: &str,
        text: &str,
    ) -> Result<(), SendError> {
        let params = [("To", to_address), ("From", from_address), ("Body", text)];

        let response = self
            .client
            .post(self.url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&params)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
