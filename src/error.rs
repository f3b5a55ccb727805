/// Error types for the request pipeline
///
/// Every failure the caller can see maps to one `ErrorKind`. Delivery
/// failures are kept separate because they never fail a request.
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GemError {
    #[error("missing required input: {0}")]
    MissingInput(String),

    #[error("inventory snapshot unavailable: {0}")]
    SnapshotUnavailable(String),

    #[error("no inventory records match the filter")]
    NoMatch,

    #[error("invalid value {value:?} for filter key '{key}': {reason}")]
    InvalidFilterValue { key: String, value: String, reason: String },

    #[error("snapshot is missing column '{column}' required by {required_by}")]
    SchemaMismatch { column: String, required_by: String },

    #[error("failed to render report: {0}")]
    RenderFailure(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GemError {
    pub fn invalid_filter(key: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        GemError::InvalidFilterValue { key: key.to_string(), value: value.into(), reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GemError::MissingInput(_) => ErrorKind::MissingInput,
            GemError::SnapshotUnavailable(_) => ErrorKind::SnapshotUnavailable,
            GemError::NoMatch => ErrorKind::NoMatch,
            GemError::InvalidFilterValue { .. } => ErrorKind::InvalidFilterValue,
            GemError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            GemError::RenderFailure(_) => ErrorKind::RenderFailure,
            GemError::Config(_) => ErrorKind::Config,
        }
    }

    /// Process exit code: 1 for client errors, 2 for server errors, 3 for an empty result
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::NoMatch => 3,
            ErrorKind::SnapshotUnavailable | ErrorKind::RenderFailure => 2,
            _ => 1,
        }
    }
}

/// Serializable error classification returned to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    MissingInput,
    SnapshotUnavailable,
    NoMatch,
    InvalidFilterValue,
    SchemaMismatch,
    RenderFailure,
    Config,
}

/// Failure of the external storage, sharing or webhook call
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("upload failed: {0}")]
    Upload(String),

    #[error("sharing failed: {0}")]
    Share(String),

    #[error("notification webhook failed: {0}")]
    Notify(String),
}

/// Error envelope written for failed requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    pub detail: String,
}

impl From<&GemError> for ErrorResponse {
    fn from(err: &GemError) -> Self {
        ErrorResponse { error: err.kind(), detail: err.to_string() }
    }
}
