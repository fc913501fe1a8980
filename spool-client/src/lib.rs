//! Spool Client - collaborators of the label engine
//!
//! Fetches entity records and persists label presets through the Spoolman
//! REST API, and keeps the preset editing session.

pub mod config;
pub mod error;
pub mod http;
pub mod presets;
pub mod source;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, PresetError, PresetResult};
pub use http::SpoolmanClient;
pub use presets::{PresetSession, PresetStore};
pub use source::{EntitySource, InMemoryEntities, InMemorySettings, SettingsStore};
