use serde::{Deserialize, Serialize};

/// 由 metadata server 的 region 屬性解析而來
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceLocation {
    pub account_id: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceIdentity {
    pub name: String,
}

/// Minimal view of the Knative `Service` resource: only `status.url` is kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(default)]
    pub status: ServiceStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedService {
    pub account_id: String,
    pub region: String,
    pub service: String,
    pub url: String,
}

impl ResolvedService {
    pub fn new(location: InstanceLocation, identity: ServiceIdentity, url: String) -> Self {
        Self {
            account_id: location.account_id,
            region: location.region,
            service: identity.name,
            url,
        }
    }
}
