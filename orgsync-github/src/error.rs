//! Error types for orgsync-github.

use thiserror::Error;

/// Failures talking to the remote host.
///
/// `NotFound` and `Forbidden` are distinguished because callers give them
/// different meanings (allow vs. abort).
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("resource not found")]
    NotFound,

    /// 401 or 403: the credential may not perform this call.
    #[error("forbidden ({status}): {message}")]
    Forbidden { status: u16, message: String },

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("{path} is not a file")]
    NotAFile { path: String },

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound)
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, RemoteError::Forbidden { .. })
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::Decode(e.to_string())
    }
}
