use std::fmt;
use thiserror::Error;

/// 解析流程中的步驟，用於包裝錯誤訊息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    ResolveLocation,
    ResolveServiceName,
    FetchServiceUrl,
}

impl fmt::Display for ResolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionStep::ResolveLocation => {
                "impossible to get the project number and region from the metadata server"
            }
            ResolutionStep::ResolveServiceName => {
                "impossible to get the Cloud Run service name from the environment"
            }
            ResolutionStep::FetchServiceUrl => "impossible to get the Cloud Run service URL",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MetadataUnavailable,
    MalformedMetadata,
    MissingServiceIdentity,
    CredentialAcquisitionFailed,
    RequestFailed,
    ResponseReadFailed,
    UpstreamError,
    InvalidResponse,
    Config,
}

#[derive(Error, Debug)]
pub enum ResolveError {
    // 內層錯誤只出現在訊息文字中
    #[error("{step}: {inner}")]
    Step {
        step: ResolutionStep,
        inner: Box<ResolveError>,
    },

    #[error("metadata server unavailable at {url}: {message}")]
    MetadataUnavailable {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("malformed metadata value {value:?}: {reason}")]
    MalformedMetadata { value: String, reason: String },

    #[error("environment variable {variable} is unset or empty")]
    MissingServiceIdentity { variable: String },

    #[error("impossible to get default credentials: {message}")]
    CredentialAcquisitionFailed { message: String },

    #[error("error when calling the Cloud Run API {url}: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("impossible to read the Cloud Run API response body: {0}")]
    ResponseReadFailed(#[source] reqwest::Error),

    #[error("Cloud Run API {url} answered with status {status}: {body}")]
    UpstreamError {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Cloud Run API returned an undecodable body: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field} ({value:?}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl ResolveError {
    /// 以失敗步驟包裝錯誤
    pub fn during(self, step: ResolutionStep) -> Self {
        ResolveError::Step {
            step,
            inner: Box::new(self),
        }
    }

    /// Error category, looking through step wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Step { inner, .. } => inner.kind(),
            ResolveError::MetadataUnavailable { .. } => ErrorKind::MetadataUnavailable,
            ResolveError::MalformedMetadata { .. } => ErrorKind::MalformedMetadata,
            ResolveError::MissingServiceIdentity { .. } => ErrorKind::MissingServiceIdentity,
            ResolveError::CredentialAcquisitionFailed { .. } => {
                ErrorKind::CredentialAcquisitionFailed
            }
            ResolveError::RequestFailed { .. } => ErrorKind::RequestFailed,
            ResolveError::ResponseReadFailed(_) => ErrorKind::ResponseReadFailed,
            ResolveError::UpstreamError { .. } => ErrorKind::UpstreamError,
            ResolveError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ResolveError::ConfigError { .. } | ResolveError::InvalidConfigValueError { .. } => {
                ErrorKind::Config
            }
        }
    }

    /// The step that failed, if the error went through the orchestrator.
    pub fn step(&self) -> Option<ResolutionStep> {
        match self {
            ResolveError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.kind() {
            ErrorKind::MetadataUnavailable => {
                "Cannot reach the instance metadata server. Is this process running on Cloud Run?"
                    .to_string()
            }
            ErrorKind::MalformedMetadata => {
                "The metadata server returned an unexpected region value.".to_string()
            }
            ErrorKind::MissingServiceIdentity => {
                "The Cloud Run service name is not available in the environment.".to_string()
            }
            ErrorKind::CredentialAcquisitionFailed => {
                "Cannot obtain credentials to call the Cloud Run API.".to_string()
            }
            ErrorKind::RequestFailed | ErrorKind::ResponseReadFailed => {
                "The call to the Cloud Run API did not complete.".to_string()
            }
            ErrorKind::UpstreamError => {
                "The Cloud Run API rejected the request for this service.".to_string()
            }
            ErrorKind::InvalidResponse => {
                "The Cloud Run API returned a response that is not valid JSON.".to_string()
            }
            ErrorKind::Config => format!("Invalid configuration: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::MetadataUnavailable | ErrorKind::MalformedMetadata => {
                "Run on Cloud Run, or point --metadata-url / GCE_METADATA_HOST at a metadata emulator"
            }
            ErrorKind::MissingServiceIdentity => {
                "Set K_SERVICE (or the variable given by --service-env-var) to the service name"
            }
            ErrorKind::CredentialAcquisitionFailed => {
                "Set GOOGLE_APPLICATION_CREDENTIALS, check the service account attached to the service, or pass --access-token"
            }
            ErrorKind::RequestFailed | ErrorKind::ResponseReadFailed => {
                "Check network egress to *.run.googleapis.com and try again"
            }
            ErrorKind::UpstreamError => {
                "Grant run.services.get (roles/run.viewer) to the service account"
            }
            ErrorKind::InvalidResponse => "Check --api-url points at the Cloud Run Admin API",
            ErrorKind::Config => "Fix the configuration file or command-line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
