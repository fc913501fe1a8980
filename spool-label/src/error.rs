//! Error types for the label engine

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Layout configuration errors
///
/// Pagination refuses to run rather than emit empty or negative-sized pages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Columns, rows or copies are zero, or a length is negative/non-finite
    #[error("Invalid layout: {0}")]
    InvalidConfig(String),

    /// Margins and spacing leave no positive room for an item
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

/// Result type for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Export errors, reported per item
#[derive(Debug, Error)]
pub enum ExportError {
    /// Item or page has no pixels at the requested resolution
    #[error("Zero-sized label: {0}")]
    ZeroSized(String),

    /// Image encoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Exchange document could not be written
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Another item already produced this file name
    #[error("File name already used: {0}")]
    NameCollision(String),

    /// Export parameters out of range
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),

    /// Writing the artifact failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

impl From<LayoutError> for AppError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::InvalidConfig(msg) => {
                AppError::with_message(ErrorCode::LayoutInvalidConfig, msg)
            }
            LayoutError::DegenerateGeometry(msg) => {
                AppError::with_message(ErrorCode::LayoutDegenerateGeometry, msg)
            }
        }
    }
}

impl From<&ExportError> for ErrorCode {
    fn from(err: &ExportError) -> Self {
        match err {
            ExportError::ZeroSized(_) => ErrorCode::ExportZeroSized,
            ExportError::NameCollision(_) => ErrorCode::ExportNameCollision,
            ExportError::InvalidOptions(_) => ErrorCode::ValueOutOfRange,
            ExportError::Io(_) => ErrorCode::IoError,
            ExportError::Image(_) | ExportError::Xml(_) => ErrorCode::ExportRasterFailed,
        }
    }
}
