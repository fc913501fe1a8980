//! Data models
//!
//! Records come from the REST collaborator and are read-only for the label
//! engine. Presets and their layout geometry are user-owned values, stored
//! as JSON setting blobs.

pub mod label_preset;
pub mod layout;
pub mod record;

// Re-exports
pub use label_preset::*;
pub use layout::*;
pub use record::*;
