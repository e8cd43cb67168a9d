use thiserror::Error;

/// Why a student lookup produced no name.
///
/// The presentation layer treats every variant the same way (no name shown);
/// the distinction only reaches the logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("student {identifier} was not found")]
    NotFound { identifier: String },
    #[error("student lookup rejected with HTTP {status}")]
    Rejected { status: u16 },
    #[error("network error during student lookup: {0}")]
    Network(String),
    #[error("unexpected student lookup response: {0}")]
    InvalidBody(String),
    /// `.` and `..` are collapsed by URL path normalization, so no request
    /// could address them as `/student/{id}`
    #[error("student ID '{identifier}' cannot be sent as a path segment")]
    Unaddressable { identifier: String },
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("slip upload rejected with HTTP {status}")]
    Rejected { status: u16, body: String },
    #[error("network error during slip upload: {0}")]
    Network(String),
    #[error("could not encode slip upload: {0}")]
    Encoding(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid backend base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
