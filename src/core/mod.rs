pub mod identity;
pub mod resolver;
pub mod service_url;

pub use crate::domain::model::{InstanceLocation, ResolvedService, ServiceIdentity};
pub use crate::domain::ports::{CredentialProvider, EnvironmentReader, MetadataSource};
pub use crate::utils::error::Result;
