use serde::{Deserialize, Serialize};

/// Global configuration, loaded from `{data_dir}/config.toml`.
///
/// Secrets (API keys, auth tokens) are never part of this file; they come
/// from environment variables and are handled by the infrastructure layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteforgeConfig {
    /// Generation model identifier.
    pub generation_model: String,
    /// Upper bound on one generation call, in seconds. On timeout the turn
    /// is treated as a generation failure, never left pending.
    pub generation_timeout_secs: u64,
    /// Storage bucket holding packaged site archives.
    pub storage_bucket: String,
    /// Supabase project base URL.
    pub supabase_url: Option<String>,
    /// Twilio account SID.
    pub twilio_account_sid: Option<String>,
    /// Our WhatsApp sender address, e.g. "whatsapp:+14155238886".
    pub twilio_from_address: Option<String>,
    /// Deploy hook endpoint that publishes an uploaded archive.
    pub deploy_hook_url: Option<String>,
}

impl Default for SiteforgeConfig {
    fn default() -> Self {
        Self {
            generation_model: "gemini-2.5-pro".to_string(),
            generation_timeout_secs: 60,
            storage_bucket: "projects".to_string(),
            supabase_url: None,
            twilio_account_sid: None,
            twilio_from_address: None,
            deploy_hook_url: None,
        }
    }
}
