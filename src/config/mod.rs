#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::metadata::DEFAULT_METADATA_BASE_URL;
use crate::core::identity::DEFAULT_SERVICE_ENV_VAR;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_env_var_name, validate_non_empty_string, validate_range, validate_url, Validate,
};
use std::env;

/// Same override the Google client libraries honour for the metadata server.
pub const METADATA_HOST_ENV_VAR: &str = "GCE_METADATA_HOST";

#[derive(Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub metadata_base_url: String,
    pub api_base_url: Option<String>,
    pub service_env_var: String,
    pub access_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            metadata_base_url: DEFAULT_METADATA_BASE_URL.to_string(),
            api_base_url: None,
            service_env_var: DEFAULT_SERVICE_ENV_VAR.to_string(),
            access_token: None,
            request_timeout_secs: None,
        }
    }
}

// access_token 不可出現在日誌中
impl std::fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("metadata_base_url", &self.metadata_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("service_env_var", &self.service_env_var)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ResolverConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = env::var(METADATA_HOST_ENV_VAR) {
            if !host.trim().is_empty() {
                config.metadata_base_url = metadata_base_url_from_host(host.trim());
            }
        }
        config
    }
}

fn metadata_base_url_from_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

impl Validate for ResolverConfig {
    fn validate(&self) -> Result<()> {
        validate_url("metadata_base_url", &self.metadata_base_url)?;

        if let Some(api_base_url) = &self.api_base_url {
            validate_url("api_base_url", api_base_url)?;
        }

        validate_env_var_name("service_env_var", &self.service_env_var)?;

        if let Some(token) = &self.access_token {
            validate_non_empty_string("access_token", token)?;
        }

        if let Some(timeout) = self.request_timeout_secs {
            validate_range("request_timeout_secs", timeout, 1, 600)?;
        }

        tracing::debug!("Resolver configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ResolverConfig::default();
        assert_eq!(config.metadata_base_url, "http://metadata.google.internal");
        assert_eq!(config.service_env_var, "K_SERVICE");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_metadata_host_override() {
        assert_eq!(
            metadata_base_url_from_host("169.254.169.254"),
            "http://169.254.169.254"
        );
        assert_eq!(
            metadata_base_url_from_host("http://localhost:8080"),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let config = ResolverConfig {
            api_base_url: Some("not a url".to_string()),
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ResolverConfig {
            request_timeout_secs: Some(0),
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ResolverConfig {
            access_token: Some(String::new()),
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let config = ResolverConfig {
            access_token: Some("ya29.secret".to_string()),
            ..ResolverConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("ya29.secret"));
        assert!(debug.contains("<redacted>"));
    }
}
