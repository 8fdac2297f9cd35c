use apiver_core::ApiError;
use thiserror::Error;

/// Errors raised by the version resolver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersioningError {
    /// A setter or config loader received a value of the wrong type or shape.
    /// Only raised at setup time, never while processing a request.
    #[error("Invalid versioning configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested major version is above the supported ceiling.
    #[error(
        "Unsupported API version {version}: highest supported major version is {max_supported}"
    )]
    UnsupportedVersion {
        /// Version text captured from the `Accept` header
        version: String,
        max_supported: u32,
    },
}

pub type Result<T> = std::result::Result<T, VersioningError>;

impl VersioningError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

impl From<VersioningError> for ApiError {
    fn from(err: VersioningError) -> Self {
        match err {
            VersioningError::UnsupportedVersion { .. } => {
                ApiError::bad_request(err.to_string()).with_error_type("unsupported_version")
            }
            VersioningError::InvalidConfiguration(_) => {
                ApiError::internal("API versioning is misconfigured").with_internal(err.to_string())
            }
        }
    }
}
