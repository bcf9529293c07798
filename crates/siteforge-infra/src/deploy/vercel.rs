//! VercelDeploy -- concrete [`DeployTrigger`] implementation posting to a
//! configured deploy hook.
//!
//! The hook receives the full [`DeployRequest`] as JSON and must answer with
//! a JSON body carrying at least a `status` field. Anything else is a
//! malformed status response, which the state machine treats as a delivery
//! failure for that turn.

use std::time::Duration;

use siteforge_core::deploy::DeployTrigger;
use siteforge_types::error::DeployError;
use siteforge_types::site::{DeployRequest, DeployStatus};

/// Deploy-hook client for Vercel (or any host exposing a compatible hook).
pub struct VercelDeploy {
    client: reqwest::Client,
    hook_url: String,
}

impl VercelDeploy {
    /// Create a new client for one deploy hook endpoint.
    pub fn new(hook_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");

        Self { client, hook_url }
    }
}

impl DeployTrigger for VercelDeploy {
    async fn deploy(&self, request: &DeployRequest) -> Result<DeployStatus, DeployError> {
        let response = self
            .client
            .post(&self.hook_url)
            .json(request)
            .send()
            .await
            .map_err(|e| DeployError::Trigger(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeployError::Trigger(format!("HTTP {status}")));
        }

        response
            .json::<DeployStatus>()
            .await
            .map_err(|e| DeployError::Status(e.to_string()))
    }
}
