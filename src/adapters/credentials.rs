use crate::domain::ports::CredentialProvider;
use crate::utils::error::{ResolveError, Result};
use async_trait::async_trait;
use google_cloud_auth::credentials::{Builder, CacheableResource};
use http::header::AUTHORIZATION;
use http::{Extensions, HeaderMap};

/// Application Default Credentials: `GOOGLE_APPLICATION_CREDENTIALS`, the gcloud
/// well-known file, then the metadata server of the runtime service account.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdcTokenProvider;

#[async_trait]
impl CredentialProvider for AdcTokenProvider {
    async fn access_token(&self) -> Result<String> {
        // 每次呼叫重新建立，不在行程內快取 token
        let credentials = Builder::default().build().map_err(|e| {
            ResolveError::CredentialAcquisitionFailed {
                message: e.to_string(),
            }
        })?;

        let headers = match credentials.headers(Extensions::new()).await {
            Ok(CacheableResource::New { data, .. }) => data,
            Ok(CacheableResource::NotModified) => {
                return Err(ResolveError::CredentialAcquisitionFailed {
                    message: "credentials returned no authorization headers".to_string(),
                })
            }
            Err(e) => {
                return Err(ResolveError::CredentialAcquisitionFailed {
                    message: e.to_string(),
                })
            }
        };

        tracing::debug!("Obtained access token from application default credentials");
        bearer_token_from_headers(&headers)
    }
}

/// 從 `Authorization: Bearer <token>` header 取出 token
pub fn bearer_token_from_headers(headers: &HeaderMap) -> Result<String> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ResolveError::CredentialAcquisitionFailed {
            message: "credentials did not provide an authorization header".to_string(),
        })?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ResolveError::CredentialAcquisitionFailed {
            message: "authorization header is not a bearer token".to_string(),
        }),
    }
}

/// 使用外部提供的固定 token（設定檔、CLI 或測試）
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if self.token.trim().is_empty() {
            return Err(ResolveError::CredentialAcquisitionFailed {
                message: "static access token is empty".to_string(),
            });
        }
        Ok(self.token.clone())
    }
}

/// Credentials used by the production wiring.
#[derive(Debug, Clone)]
pub enum DefaultCredentials {
    Adc(AdcTokenProvider),
    Static(StaticTokenProvider),
}

#[async_trait]
impl CredentialProvider for DefaultCredentials {
    async fn access_token(&self) -> Result<String> {
        match self {
            DefaultCredentials::Adc(provider) => provider.access_token().await,
            DefaultCredentials::Static(provider) => provider.access_token().await,
        }
    }
}
