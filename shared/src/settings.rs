//! Setting keys and scalar print preferences
//!
//! The REST collaborator is an opaque key/value store of JSON-encoded
//! strings. These keys are owned by the label engine.

use serde::{Deserialize, Serialize};

/// `Vec<LabelPreset>` collection
pub const KEY_PRESETS: &str = "label_presets";
/// Id of the preset selected last
pub const KEY_CURRENT_PRESET: &str = "label_current_preset";
/// Preview zoom factor
pub const KEY_PREVIEW_SCALE: &str = "label_preview_scale";
/// Whether entity links use the full web URL instead of the short scheme
pub const KEY_USE_FULL_URL: &str = "label_use_full_url";

/// Scalar print preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintPrefs {
    pub current_preset_id: Option<String>,
    pub preview_scale: f32,
    pub use_full_url: bool,
}

impl Default for PrintPrefs {
    fn default() -> Self {
        Self {
            current_preset_id: None,
            preview_scale: 0.6,
            use_full_url: false,
        }
    }
}
