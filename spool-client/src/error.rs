//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected by the server
    #[error("Validation error: {0}")]
    Validation(String),

    /// Server-side failure
    #[error("Server error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Preset persistence and editing errors
#[derive(Debug, Error)]
pub enum PresetError {
    /// Reading or writing the settings store failed
    #[error("Settings store error: {0}")]
    Store(#[from] ClientError),

    /// The stored blob is not a valid preset collection
    #[error("Stored presets are corrupted: {0}")]
    Corrupted(String),

    /// Two presets share an id
    #[error("Duplicate preset id: {0}")]
    DuplicateId(String),

    /// A preset value is outside its valid range
    #[error("Preset value out of range: {0}")]
    OutOfRange(String),

    /// No preset with this id
    #[error("Preset not found: {0}")]
    NotFound(String),

    /// A session always keeps one preset
    #[error("Cannot delete the last preset")]
    LastRemaining,
}

/// Result type for preset operations
pub type PresetResult<T> = Result<T, PresetError>;

impl From<&ClientError> for ErrorCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::NotFound(_) => ErrorCode::NotFound,
            ClientError::Validation(_) => ErrorCode::ValidationFailed,
            ClientError::Http(_)
            | ClientError::Internal(_)
            | ClientError::InvalidResponse(_)
            | ClientError::Serialization(_) => ErrorCode::UpstreamError,
        }
    }
}

impl From<PresetError> for AppError {
    fn from(err: PresetError) -> Self {
        let code = match &err {
            PresetError::Store(_) => ErrorCode::PresetSaveFailed,
            PresetError::Corrupted(_) => ErrorCode::PresetCorrupted,
            PresetError::DuplicateId(_) => ErrorCode::PresetDuplicateId,
            PresetError::OutOfRange(_) => ErrorCode::ValueOutOfRange,
            PresetError::NotFound(_) => ErrorCode::PresetNotFound,
            PresetError::LastRemaining => ErrorCode::PresetLastRemaining,
        };
        AppError::with_message(code, err.to_string())
    }
}
