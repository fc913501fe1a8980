//! Shared types for the spool label workspace
//!
//! Entity records handed over by the REST collaborator, label presets and
//! their layout geometry, print preferences and the error code table used
//! to surface failures to the user.

pub mod error;
pub mod models;
pub mod settings;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use models::{
    BorderMode, DecodedValue, Edges, EntityKind, FieldValue, LabelPreset, LayoutConfig,
    PaperFormat, PaperSize, PresetFlags, Record, Spacing,
};
pub use settings::PrintPrefs;
