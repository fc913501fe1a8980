//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Template errors
//! - 2xxx: Layout errors
//! - 3xxx: Export errors
//! - 4xxx: Preset / persistence errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values so the console and any embedding UI agree on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Template ====================
    /// Template is empty
    TemplateEmpty = 1001,

    // ==================== 2xxx: Layout ====================
    /// Columns, rows or copies are zero
    LayoutInvalidConfig = 2001,
    /// Computed item or page size is not positive
    LayoutDegenerateGeometry = 2002,

    // ==================== 3xxx: Export ====================
    /// An item could not be rasterized
    ExportRasterFailed = 3001,
    /// An item has zero width or height
    ExportZeroSized = 3002,
    /// Two items map to the same file name
    ExportNameCollision = 3003,
    /// Export batch was cancelled
    ExportCancelled = 3004,

    // ==================== 4xxx: Preset ====================
    /// Preset not found
    PresetNotFound = 4001,
    /// Preset id already used in the collection
    PresetDuplicateId = 4002,
    /// Stored preset blob could not be decoded
    PresetCorrupted = 4003,
    /// Saving presets failed, local draft kept
    PresetSaveFailed = 4004,
    /// Cannot delete the last remaining preset
    PresetLastRemaining = 4005,

    // ==================== 9xxx: System ====================
    /// Upstream REST service unreachable or failing
    UpstreamError = 9002,
    /// File system error
    IoError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::ValueOutOfRange => "Value out of range",

            // Template
            ErrorCode::TemplateEmpty => "Label template is empty",

            // Layout
            ErrorCode::LayoutInvalidConfig => "Columns, rows and copies must be at least 1",
            ErrorCode::LayoutDegenerateGeometry => {
                "Margins and spacing leave no room for the labels"
            }

            // Export
            ErrorCode::ExportRasterFailed => "Label could not be rendered",
            ErrorCode::ExportZeroSized => "Label has zero width or height",
            ErrorCode::ExportNameCollision => "Another label already uses this file name",
            ErrorCode::ExportCancelled => "Export was cancelled",

            // Preset
            ErrorCode::PresetNotFound => "Preset not found",
            ErrorCode::PresetDuplicateId => "Preset id is already in use",
            ErrorCode::PresetCorrupted => "Stored presets could not be read",
            ErrorCode::PresetSaveFailed => "Presets could not be saved",
            ErrorCode::PresetLastRemaining => "The last preset cannot be deleted",

            // System
            ErrorCode::UpstreamError => "Spool service request failed",
            ErrorCode::IoError => "File system error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Template
            1001 => Ok(ErrorCode::TemplateEmpty),

            // Layout
            2001 => Ok(ErrorCode::LayoutInvalidConfig),
            2002 => Ok(ErrorCode::LayoutDegenerateGeometry),

            // Export
            3001 => Ok(ErrorCode::ExportRasterFailed),
            3002 => Ok(ErrorCode::ExportZeroSized),
            3003 => Ok(ErrorCode::ExportNameCollision),
            3004 => Ok(ErrorCode::ExportCancelled),

            // Preset
            4001 => Ok(ErrorCode::PresetNotFound),
            4002 => Ok(ErrorCode::PresetDuplicateId),
            4003 => Ok(ErrorCode::PresetCorrupted),
            4004 => Ok(ErrorCode::PresetSaveFailed),
            4005 => Ok(ErrorCode::PresetLastRemaining),

            // System
            9002 => Ok(ErrorCode::UpstreamError),
            9003 => Ok(ErrorCode::IoError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_through_u16() {
        for code in [
            ErrorCode::ValueOutOfRange,
            ErrorCode::LayoutDegenerateGeometry,
            ErrorCode::ExportNameCollision,
            ErrorCode::PresetSaveFailed,
            ErrorCode::UpstreamError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_unknown_value_rejected() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&ErrorCode::PresetNotFound).unwrap();
        assert_eq!(json, "4001");
        let back: ErrorCode = serde_json::from_str("2001").unwrap();
        assert_eq!(back, ErrorCode::LayoutInvalidConfig);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::ExportCancelled.to_string(), "E3004");
    }
}
