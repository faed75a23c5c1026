use crate::config::toml_config::TomlConfig;
use crate::config::ResolverConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cloudrun-url")]
#[command(about = "Print the public URL of the Cloud Run service this process runs in")]
pub struct CliArgs {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Metadata server base URL")]
    pub metadata_url: Option<String>,

    #[arg(long, help = "Cloud Run Admin API base URL (default: https://<region>-run.googleapis.com)")]
    pub api_url: Option<String>,

    #[arg(long, help = "Environment variable holding the service name")]
    pub service_env_var: Option<String>,

    #[arg(
        long,
        env = "CLOUDRUN_URL_ACCESS_TOKEN",
        hide_env_values = true,
        help = "OAuth2 access token to use instead of application default credentials (env: CLOUDRUN_URL_ACCESS_TOKEN)"
    )]
    pub access_token: Option<String>,

    #[arg(long, help = "HTTP request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Print project, region, service and URL as JSON")]
    pub json: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    /// 預設值 → 環境變數 → 設定檔 → 命令列參數
    pub fn to_config(&self) -> Result<ResolverConfig> {
        let mut config = ResolverConfig::from_env();

        if let Some(path) = &self.config {
            TomlConfig::from_file(path)?.apply_to(&mut config);
        }

        if let Some(url) = &self.metadata_url {
            config.metadata_base_url = url.clone();
        }
        if let Some(url) = &self.api_url {
            config.api_base_url = Some(url.clone());
        }
        if let Some(name) = &self.service_env_var {
            config.service_env_var = name.clone();
        }
        if let Some(token) = &self.access_token {
            config.access_token = Some(token.clone());
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = Some(timeout);
        }

        Ok(config)
    }
}
