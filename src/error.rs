use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Problems with the environment-supplied configuration.
#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("{name} is not a valid http(s) URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Failures talking to the photo API.
#[derive(ThisError, Debug)]
pub enum ApiError {
    /// Connection, timeout or body decoding failure
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("photo API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

#[derive(ThisError, Debug)]
pub enum UploadError {
    #[error("unsupported file extension {extension:?}")]
    UnsupportedExtension { extension: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}
