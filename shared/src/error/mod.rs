//! Unified error system for the label workspace
//!
//! - [`ErrorCode`]: Standardized error codes for everything surfaced to the user
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Template errors
//! - 2xxx: Layout errors
//! - 3xxx: Export errors
//! - 4xxx: Preset / persistence errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::PresetNotFound);
//! assert_eq!(err.code, ErrorCode::PresetNotFound);
//!
//! let err = AppError::with_message(ErrorCode::LayoutInvalidConfig, "12 columns do not fit")
//!     .with_detail("columns", 12);
//! assert!(err.details.is_some());
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
