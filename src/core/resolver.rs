use crate::adapters::{
    AdcTokenProvider, DefaultCredentials, MetadataServerClient, ProcessEnvironment,
    StaticTokenProvider,
};
use crate::config::ResolverConfig;
use crate::core::identity::IdentityResolver;
use crate::core::service_url::ServiceUrlClient;
use crate::domain::model::ResolvedService;
use crate::domain::ports::{CredentialProvider, EnvironmentReader, MetadataSource};
use crate::utils::error::{ResolutionStep, ResolveError, Result};
use reqwest::Client;
use std::time::Duration;

/// Resolver wired to the real metadata server, process environment and credentials.
pub type DefaultResolver =
    ServiceUrlResolver<MetadataServerClient, ProcessEnvironment, DefaultCredentials>;

/// Runs the three resolution steps in order: location, service name, service URL.
pub struct ServiceUrlResolver<M, E, C>
where
    M: MetadataSource,
    E: EnvironmentReader,
    C: CredentialProvider,
{
    identity: IdentityResolver<M, E>,
    client: ServiceUrlClient<C>,
}

impl<M, E, C> ServiceUrlResolver<M, E, C>
where
    M: MetadataSource,
    E: EnvironmentReader,
    C: CredentialProvider,
{
    pub fn new(identity: IdentityResolver<M, E>, client: ServiceUrlClient<C>) -> Self {
        Self { identity, client }
    }

    pub async fn resolve_service(&self) -> Result<ResolvedService> {
        let location = self
            .identity
            .resolve_location()
            .await
            .map_err(|e| e.during(ResolutionStep::ResolveLocation))?;

        let identity = self
            .identity
            .resolve_service_name()
            .map_err(|e| e.during(ResolutionStep::ResolveServiceName))?;

        let url = self
            .client
            .fetch_service_url(&location.region, &location.account_id, &identity.name)
            .await
            .map_err(|e| e.during(ResolutionStep::FetchServiceUrl))?;

        tracing::debug!("Resolved URL of service {}: {}", identity.name, url);
        Ok(ResolvedService::new(location, identity, url))
    }

    pub async fn get_current_service_url(&self) -> Result<String> {
        Ok(self.resolve_service().await?.url)
    }
}

impl DefaultResolver {
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let http = builder.build().map_err(|e| ResolveError::ConfigError {
            message: format!("cannot build HTTP client: {}", e),
        })?;

        let metadata = MetadataServerClient::new(config.metadata_base_url.clone(), http.clone());

        let credentials = match &config.access_token {
            Some(token) => DefaultCredentials::Static(StaticTokenProvider::new(token.clone())),
            None => DefaultCredentials::Adc(AdcTokenProvider),
        };

        let identity = IdentityResolver::new(metadata, ProcessEnvironment)
            .with_service_env_var(config.service_env_var.clone());
        let client = ServiceUrlClient::new(credentials, http)
            .with_api_base_url(config.api_base_url.clone());

        Ok(Self::new(identity, client))
    }
}
