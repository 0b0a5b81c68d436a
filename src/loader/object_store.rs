use async_trait::async_trait;
use std::time::Duration;

use super::{LoadError, SnapshotLoader};

/// Reads extracts from an HTTP object-store endpoint.
///
/// Objects are fetched with a plain `GET <base_url>/<source_id>`. A bearer
/// token is sent when configured. Requests are not SigV4-signed, so a private
/// S3-style bucket needs a signing proxy in front of it. Public buckets and
/// bearer-token storage REST APIs work directly.
pub struct ObjectStoreLoader {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ObjectStoreLoader {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn object_url(&self, source_id: &str) -> String {
        format!("{}/{}", self.base_url, source_id.trim_start_matches('/'))
    }
}

#[async_trait]
impl SnapshotLoader for ObjectStoreLoader {
    fn describe(&self) -> String {
        format!("object-store:{}", self.base_url)
    }

    async fn fetch(&self, source_id: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.object_url(source_id);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LoadError::unavailable(source_id, format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(LoadError::unavailable(
                source_id,
                format!("GET {} returned {}: {}", url, status, snippet),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::unavailable(source_id, format!("reading body of {} failed: {}", url, e)))?;

        tracing::debug!(source = %source_id, bytes = bytes.len(), "Fetched object");

        Ok(bytes.to_vec())
    }
}
