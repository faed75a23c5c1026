use crate::config::ResolverConfig;
use crate::utils::error::{ResolveError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional configuration file; every section and key may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub metadata: Option<MetadataSection>,
    pub api: Option<ApiSection>,
    pub service: Option<ServiceSection>,
    pub credentials: Option<CredentialsSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataSection {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSection {
    pub env_var: Option<String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsSection {
    pub access_token: Option<String>,
}

impl std::fmt::Debug for CredentialsSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsSection")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| ResolveError::ConfigError {
                message: format!("cannot read {}: {}", path.as_ref().display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ResolveError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 將檔案中有設定的值覆蓋到既有配置上
    pub fn apply_to(&self, config: &mut ResolverConfig) {
        if let Some(base_url) = self.metadata.as_ref().and_then(|m| m.base_url.clone()) {
            config.metadata_base_url = base_url;
        }
        if let Some(api) = &self.api {
            if let Some(base_url) = &api.base_url {
                config.api_base_url = Some(base_url.clone());
            }
            if let Some(timeout) = api.timeout_seconds {
                config.request_timeout_secs = Some(timeout);
            }
        }
        if let Some(env_var) = self.service.as_ref().and_then(|s| s.env_var.clone()) {
            config.service_env_var = env_var;
        }
        if let Some(token) = self.credentials.as_ref().and_then(|c| c.access_token.clone()) {
            config.access_token = Some(token);
        }
    }
}

/// 替換環境變數 (例如 ${ACCESS_TOKEN})，未定義的變數保持原樣
fn substitute_env_vars(content: &str) -> String {
    let re = match Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}
