pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use config::ResolverConfig;
pub use crate::core::{
    identity::{parse_instance_location, IdentityResolver},
    resolver::{DefaultResolver, ServiceUrlResolver},
    service_url::ServiceUrlClient,
};
pub use domain::model::{InstanceLocation, ResolvedService, ServiceIdentity};
pub use utils::error::{ErrorKind, ResolveError, ResolutionStep, Result};

/// Public URL of the Cloud Run service this process runs in.
///
/// Uses the metadata server, `K_SERVICE` and application default credentials;
/// `GCE_METADATA_HOST` redirects metadata lookups.
pub async fn get_service_url() -> Result<String> {
    DefaultResolver::from_config(&ResolverConfig::from_env())?
        .get_current_service_url()
        .await
}
