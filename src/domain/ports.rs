use crate::utils::error::Result;
use async_trait::async_trait;

/// Instance metadata server.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// 回傳 metadata 屬性的原始字串，例如 `instance/region`
    async fn get(&self, path: &str) -> Result<String>;
}

pub trait EnvironmentReader: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Supplies an OAuth2 access token for the management API.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}
