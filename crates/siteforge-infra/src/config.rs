//! Global configuration loader for Siteforge.
//!
//! Reads `config.toml` from the data directory (`~/.siteforge/` in
//! production) and deserializes it into [`SiteforgeConfig`]. Falls back to
//! defaults when the file is missing or malformed. Secrets never live in
//! the file; they come from environment variables wrapped in SecretString.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use siteforge_types::config::SiteforgeConfig;

/// Resolve the data directory: `SITEFORGE_DATA_DIR` env var, falling back to
/// `~/.siteforge`.
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var("SITEFORGE_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".siteforge")
        }
    }
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`SiteforgeConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> SiteforgeConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            return SiteforgeConfig::default();
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            return SiteforgeConfig::default();
        }
    };

    match toml::from_str::<SiteforgeConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            SiteforgeConfig::default()
        }
    }
}

/// Read a secret from the environment, wrapped so it never appears in Debug
/// output or logs. Empty values count as absent.
pub fn env_secret(name: &str) -> Option<SecretString> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}
