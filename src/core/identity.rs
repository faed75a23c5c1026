use crate::domain::model::{InstanceLocation, ServiceIdentity};
use crate::domain::ports::{EnvironmentReader, MetadataSource};
use crate::utils::error::{ResolveError, Result};

pub const REGION_METADATA_PATH: &str = "instance/region";

/// Cloud Run container contract: name of the running service.
pub const DEFAULT_SERVICE_ENV_VAR: &str = "K_SERVICE";

const ACCOUNT_SEGMENT: usize = 1;
const REGION_SEGMENT: usize = 3;

/// 解析 `projects/<projectNumber>/regions/<region>` 格式的字串。
///
/// Only the positions are checked, not the prefix words, so `a/ACCT/b/REGION`
/// yields `(ACCT, REGION)`. Extra trailing segments are ignored.
pub fn parse_instance_location(raw: &str) -> Result<InstanceLocation> {
    let value = raw.trim();
    let segments: Vec<&str> = value.split('/').collect();

    if segments.len() <= REGION_SEGMENT {
        return Err(ResolveError::MalformedMetadata {
            value: value.to_string(),
            reason: format!(
                "expected at least {} '/'-separated segments, got {}",
                REGION_SEGMENT + 1,
                segments.len()
            ),
        });
    }

    let account_id = segments[ACCOUNT_SEGMENT];
    let region = segments[REGION_SEGMENT];
    if account_id.is_empty() || region.is_empty() {
        return Err(ResolveError::MalformedMetadata {
            value: value.to_string(),
            reason: "account identifier and region must not be empty".to_string(),
        });
    }

    if !is_valid_region(region) {
        return Err(ResolveError::MalformedMetadata {
            value: value.to_string(),
            reason: format!("region {:?} may only contain letters, digits and '-'", region),
        });
    }

    Ok(InstanceLocation {
        account_id: account_id.to_string(),
        region: region.to_string(),
    })
}

/// 區域名稱會成為 API 主機名稱的一部分
pub fn is_valid_region(region: &str) -> bool {
    !region.is_empty() && region.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Derives where this instance runs and which service it belongs to.
pub struct IdentityResolver<M: MetadataSource, E: EnvironmentReader> {
    metadata: M,
    env: E,
    service_env_var: String,
}

impl<M: MetadataSource, E: EnvironmentReader> IdentityResolver<M, E> {
    pub fn new(metadata: M, env: E) -> Self {
        Self {
            metadata,
            env,
            service_env_var: DEFAULT_SERVICE_ENV_VAR.to_string(),
        }
    }

    pub fn with_service_env_var(mut self, name: impl Into<String>) -> Self {
        self.service_env_var = name.into();
        self
    }

    pub async fn resolve_location(&self) -> Result<InstanceLocation> {
        let raw = self.metadata.get(REGION_METADATA_PATH).await?;
        let location = parse_instance_location(&raw)?;

        tracing::debug!(
            "Instance runs in project {} region {}",
            location.account_id,
            location.region
        );
        Ok(location)
    }

    pub fn resolve_service_name(&self) -> Result<ServiceIdentity> {
        let name = self
            .env
            .var(&self.service_env_var)
            .map(|value| value.trim().to_string());

        match name {
            Some(name) if !name.is_empty() => {
                tracing::debug!("Service name from {}: {}", self.service_env_var, name);
                Ok(ServiceIdentity { name })
            }
            _ => Err(ResolveError::MissingServiceIdentity {
                variable: self.service_env_var.clone(),
            }),
        }
    }
}
