//! SupabaseStorage -- concrete [`SiteStore`] implementation for Supabase
//! Storage buckets.
//!
//! Uploads go to the object endpoint with bearer auth; the returned URL is
//! the bucket's public object URL, which is valid as long as the bucket is
//! configured public.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use siteforge_core::storage::SiteStore;
use siteforge_types::error::StorageError;

/// Supabase Storage-backed archive store.
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: SecretString,
}

impl SupabaseStorage {
    /// Create a new store targeting one bucket of one Supabase project.
    pub fn new(base_url: String, bucket: String, service_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            service_key,
        }
    }

    fn object_url(&self, object_key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object_key
        )
    }

    fn public_url(&self, object_key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object_key
        )
    }
}

impl SiteStore for SupabaseStorage {
    async fn upload(&self, object_key: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let response = self
            .client
            .post(self.object_url(object_key))
            .bearer_auth(self.service_key.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/zip")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(self.public_url(object_key))
    }
}
