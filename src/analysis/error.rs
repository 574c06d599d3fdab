use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong while analysing a meal photo.
///
/// Sources are flattened to strings so the error can be cloned into
/// UI messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("cannot read {}: {reason}", .path.display())]
    FileAccess { path: PathBuf, reason: String },

    #[error("image is {size} bytes, the upload limit is {limit} bytes")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("server answered {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("unexpected response: {0}")]
    UnexpectedResponseShape(String),
}

/// Coarse failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileAccess,
    Encoding,
    Network,
    UnexpectedResponseShape,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::FileAccess { .. } | AnalysisError::ImageTooLarge { .. } => {
                ErrorKind::FileAccess
            }
            AnalysisError::Encoding(_) => ErrorKind::Encoding,
            AnalysisError::Network(_)
            | AnalysisError::Timeout(_)
            | AnalysisError::HttpStatus { .. } => ErrorKind::Network,
            AnalysisError::UnexpectedResponseShape(_) => ErrorKind::UnexpectedResponseShape,
        }
    }

    /// Map a reqwest failure, keeping timeouts distinct
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            AnalysisError::Timeout(timeout)
        } else {
            AnalysisError::Network(err.to_string())
        }
    }
}
