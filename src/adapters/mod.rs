// Adapters layer: concrete implementations of the domain ports (metadata server, process env, credentials).

pub mod credentials;
pub mod environment;
pub mod metadata;

pub use credentials::{AdcTokenProvider, DefaultCredentials, StaticTokenProvider};
pub use environment::ProcessEnvironment;
pub use metadata::MetadataServerClient;
