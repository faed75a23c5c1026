use crate::domain::ports::MetadataSource;
use crate::utils::error::{ResolveError, Result};
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_METADATA_BASE_URL: &str = "http://metadata.google.internal";

/// HTTP client for the GCE/Cloud Run metadata server.
#[derive(Debug, Clone)]
pub struct MetadataServerClient {
    base_url: String,
    client: Client,
}

impl MetadataServerClient {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn attribute_url(&self, path: &str) -> String {
        format!(
            "{}/computeMetadata/v1/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl MetadataSource for MetadataServerClient {
    async fn get(&self, path: &str) -> Result<String> {
        let url = self.attribute_url(path);
        tracing::debug!("Querying metadata server: {}", url);

        // 沒有這個 header 時 metadata server 會拒絕請求
        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| ResolveError::MetadataUnavailable {
                url: url.clone(),
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        tracing::debug!("Metadata server response status: {}", status);

        if !status.is_success() {
            return Err(ResolveError::MetadataUnavailable {
                url,
                status: Some(status.as_u16()),
                message: format!("unexpected status {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ResolveError::MetadataUnavailable {
                url,
                status: Some(status.as_u16()),
                message: e.to_string(),
            })
    }
}
