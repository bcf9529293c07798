//! Application state wiring all services together.
//!
//! The conversation service is generic over repository/capability traits,
//! but AppState pins it to the concrete infra implementations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use siteforge_core::conversation::ConversationService;
use siteforge_core::notify::Notifier;
use siteforge_infra::config::{env_secret, load_config, resolve_data_dir};
use siteforge_infra::deploy::vercel::VercelDeploy;
use siteforge_infra::llm::gemini::GeminiClient;
use siteforge_infra::messaging::twilio::TwilioSender;
use siteforge_infra::sqlite::pool::DatabasePool;
use siteforge_infra::sqlite::project::SqliteProjectRepository;
use siteforge_infra::sqlite::prompt::SqlitePromptRepository;
use siteforge_infra::sqlite::user::SqliteUserRepository;
use siteforge_infra::storage::supabase::SupabaseStorage;
use siteforge_types::user::Platform;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteConversationService = ConversationService<
    SqliteUserRepository,
    SqliteProjectRepository,
    SqlitePromptRepository,
    GeminiClient,
    TwilioSender,
    SupabaseStorage,
    VercelDeploy,
>;

/// Shared application state for the webhook server.
#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<ConcreteConversationService>,
    /// Our WhatsApp sender address, used when the inbound payload does not
    /// carry a recipient.
    pub from_address: String,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    ///
    /// Secrets come from the environment (`GEMINI_API_KEY`,
    /// `TWILIO_AUTH_TOKEN`, `SUPABASE_SERVICE_KEY`); endpoints and account
    /// identifiers from `{data_dir}/config.toml`.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("siteforge.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        let config = load_config(&data_dir).await;

        let gemini_key = env_secret("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;
        let twilio_token =
            env_secret("TWILIO_AUTH_TOKEN").context("TWILIO_AUTH_TOKEN must be set")?;
        let supabase_key =
            env_secret("SUPABASE_SERVICE_KEY").context("SUPABASE_SERVICE_KEY must be set")?;

        let account_sid = config
            .twilio_account_sid
            .clone()
            .context("twilio_account_sid must be set in config.toml")?;
        let from_address = config
            .twilio_from_address
            .clone()
            .context("twilio_from_address must be set in config.toml")?;
        let supabase_url = config
            .supabase_url
            .clone()
            .context("supabase_url must be set in config.toml")?;
        let deploy_hook = config
            .deploy_hook_url
            .clone()
            .context("deploy_hook_url must be set in config.toml")?;

        let conversation = ConversationService::new(
            SqliteUserRepository::new(db_pool.clone()),
            SqliteProjectRepository::new(db_pool.clone()),
            SqlitePromptRepository::new(db_pool.clone()),
            GeminiClient::new(gemini_key, config.generation_model.clone()),
            Notifier::new(TwilioSender::new(account_sid, twilio_token)),
            SupabaseStorage::new(supabase_url, config.storage_bucket.clone(), supabase_key),
            VercelDeploy::new(deploy_hook),
            Platform::Whatsapp,
            Duration::from_secs(config.generation_timeout_secs),
        );

        Ok(Self {
            conversation: Arc::new(conversation),
            from_address,
            db_pool,
        })
    }
}
