use crate::core::identity::is_valid_region;
use crate::domain::model::ServiceDescriptor;
use crate::domain::ports::CredentialProvider;
use crate::utils::error::{ResolveError, Result};
use reqwest::Client;
use url::Url;

/// Regional endpoint of the Cloud Run Admin API.
pub fn default_api_base_url(region: &str) -> String {
    format!("https://{}-run.googleapis.com", region)
}

/// Calls the Knative serving API of Cloud Run to read a service's URL.
pub struct ServiceUrlClient<C: CredentialProvider> {
    credentials: C,
    client: Client,
    api_base_url: Option<String>,
}

impl<C: CredentialProvider> ServiceUrlClient<C> {
    pub fn new(credentials: C, client: Client) -> Self {
        Self {
            credentials,
            client,
            api_base_url: None,
        }
    }

    /// 覆寫 API 根網址（測試或模擬器使用），未設定時依 region 組出
    pub fn with_api_base_url(mut self, base_url: Option<String>) -> Self {
        self.api_base_url = base_url;
        self
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    /// Knative `Service` resource URL; identifiers are percent-encoded as path segments.
    pub fn service_api_url(&self, region: &str, account_id: &str, service: &str) -> Result<Url> {
        if !is_valid_region(region) {
            return Err(ResolveError::MalformedMetadata {
                value: region.to_string(),
                reason: "region may only contain letters, digits and '-'".to_string(),
            });
        }

        let base = match &self.api_base_url {
            Some(base) => base.clone(),
            None => default_api_base_url(region),
        };
        let mut url = Url::parse(&base).map_err(|e| ResolveError::ConfigError {
            message: format!("invalid Cloud Run API base URL {:?}: {}", base, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| ResolveError::ConfigError {
                message: format!("Cloud Run API base URL {:?} cannot have a path", base),
            })?
            .pop_if_empty()
            .extend([
                "apis",
                "serving.knative.dev",
                "v1",
                "namespaces",
                account_id,
                "services",
                service,
            ]);

        Ok(url)
    }

    pub async fn fetch_service_url(
        &self,
        region: &str,
        account_id: &str,
        service: &str,
    ) -> Result<String> {
        let url = self.service_api_url(region, account_id, service)?;
        let token = self.credentials.access_token().await?;

        tracing::debug!("Calling Cloud Run API: {}", url);
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| ResolveError::RequestFailed {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("Cloud Run API response status: {}", status);

        let body = response
            .bytes()
            .await
            .map_err(ResolveError::ResponseReadFailed)?;

        if !status.is_success() {
            return Err(ResolveError::UpstreamError {
                url: url.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let descriptor: ServiceDescriptor = serde_json::from_slice(&body)?;
        if descriptor.status.url.is_empty() {
            tracing::warn!("Cloud Run API response for {} has no status.url", service);
        }

        Ok(descriptor.status.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticTokenProvider;
    use crate::utils::error::ErrorKind;
    use httpmock::prelude::*;

    const SERVICE_PATH: &str = "/apis/serving.knative.dev/v1/namespaces/123456789/services/hello";

    fn client_for(server: &MockServer) -> ServiceUrlClient<StaticTokenProvider> {
        ServiceUrlClient::new(StaticTokenProvider::new("test-token"), Client::new())
            .with_api_base_url(Some(server.base_url()))
    }

    #[test]
    fn test_default_service_api_url() {
        let client = ServiceUrlClient::new(StaticTokenProvider::new("t"), Client::new());
        assert_eq!(
            client
                .service_api_url("europe-west1", "123456789", "hello")
                .unwrap()
                .as_str(),
            "https://europe-west1-run.googleapis.com/apis/serving.knative.dev/v1/namespaces/123456789/services/hello"
        );
    }

    #[test]
    fn test_overridden_service_api_url_trims_slash() {
        let client = ServiceUrlClient::new(StaticTokenProvider::new("t"), Client::new())
            .with_api_base_url(Some("http://localhost:8080/".to_string()));
        assert_eq!(
            client
                .service_api_url("us-central1", "1", "svc")
                .unwrap()
                .as_str(),
            "http://localhost:8080/apis/serving.knative.dev/v1/namespaces/1/services/svc"
        );
    }

    #[test]
    fn test_service_api_url_encodes_identifiers() {
        let client = ServiceUrlClient::new(StaticTokenProvider::new("t"), Client::new())
            .with_api_base_url(Some("http://localhost:8080".to_string()));
        let url = client
            .service_api_url("us-central1", "1/2", "a b?c#d")
            .unwrap();

        assert_eq!(
            url.path(),
            "/apis/serving.knative.dev/v1/namespaces/1%2F2/services/a%20b%3Fc%23d"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_service_api_url_keeps_base_path_prefix() {
        let client = ServiceUrlClient::new(StaticTokenProvider::new("t"), Client::new())
            .with_api_base_url(Some("http://localhost:8080/emulator/".to_string()));
        assert_eq!(
            client.service_api_url("us-central1", "1", "svc").unwrap().path(),
            "/emulator/apis/serving.knative.dev/v1/namespaces/1/services/svc"
        );
    }

    #[test]
    fn test_service_api_url_rejects_unsafe_region() {
        let client = ServiceUrlClient::new(StaticTokenProvider::new("t"), Client::new());
        let err = client
            .service_api_url("us-central1?x=1#", "1", "svc")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedMetadata);
    }

    #[tokio::test]
    async fn test_fetch_service_url_success() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(SERVICE_PATH)
                    .header("authorization", "Bearer test-token");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({"status": {"url": "https://example.run.app"}}));
            })
            .await;

        let url = client_for(&server)
            .fetch_service_url("us-central1", "123456789", "hello")
            .await
            .unwrap();

        api_mock.assert_async().await;
        assert_eq!(url, "https://example.run.app");
    }

    #[tokio::test]
    async fn test_fetch_service_url_missing_field_is_empty() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path(SERVICE_PATH);
                then.status(200)
                    .json_body(serde_json::json!({"kind": "Service", "status": {"conditions": []}}));
            })
            .await;

        let url = client_for(&server)
            .fetch_service_url("us-central1", "123456789", "hello")
            .await
            .unwrap();

        api_mock.assert_async().await;
        assert_eq!(url, "");
    }

    #[tokio::test]
    async fn test_fetch_service_url_non_success_status() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path(SERVICE_PATH);
                then.status(403)
                    .json_body(serde_json::json!({"error": {"code": 403, "status": "PERMISSION_DENIED"}}));
            })
            .await;

        let err = client_for(&server)
            .fetch_service_url("us-central1", "123456789", "hello")
            .await
            .unwrap_err();

        api_mock.assert_async().await;
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        match err {
            ResolveError::UpstreamError { status, body, .. } => {
                assert_eq!(status, 403);
                assert!(body.contains("PERMISSION_DENIED"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_service_url_malformed_json() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(SERVICE_PATH);
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let err = client_for(&server)
            .fetch_service_url("us-central1", "123456789", "hello")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_fetch_service_url_credentials_failure_skips_request() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path(SERVICE_PATH);
                then.status(200);
            })
            .await;

        let client = ServiceUrlClient::new(StaticTokenProvider::new(""), Client::new())
            .with_api_base_url(Some(server.base_url()));
        let err = client
            .fetch_service_url("us-central1", "123456789", "hello")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CredentialAcquisitionFailed);
        api_mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_fetch_service_url_truncated_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        // 宣告的 Content-Length 大於實際送出的內容後直接斷線
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"status\":",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = ServiceUrlClient::new(StaticTokenProvider::new("t"), Client::new())
            .with_api_base_url(Some(format!("http://{}", addr)));
        let err = client
            .fetch_service_url("us-central1", "123456789", "hello")
            .await
            .unwrap_err();

        server.await.unwrap();
        assert_eq!(err.kind(), ErrorKind::ResponseReadFailed);
    }

    #[tokio::test]
    async fn test_fetch_service_url_unreachable_api() {
        let client = ServiceUrlClient::new(StaticTokenProvider::new("t"), Client::new())
            .with_api_base_url(Some("http://127.0.0.1:1".to_string()));
        let err = client
            .fetch_service_url("us-central1", "123456789", "hello")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RequestFailed);
    }
}
