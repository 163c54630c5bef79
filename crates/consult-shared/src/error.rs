use thiserror::Error;

/// Errors surfaced by the chat workflows.
///
/// `Unauthenticated`, `Validation` and `NotFound` are raised before any
/// state is touched.  `SendFailed` and `OperationFailed` are raised only
/// after the provisional state has been rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Failure of the simulated remote round-trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Remote rejected the request: {0}")]
    Rejected(String),

    #[error("Remote unavailable")]
    Unavailable,
}

impl ChatError {
    pub fn send_failed(err: RemoteError) -> Self {
        Self::SendFailed(err.to_string())
    }

    pub fn operation_failed(err: RemoteError) -> Self {
        Self::OperationFailed(err.to_string())
    }
}
