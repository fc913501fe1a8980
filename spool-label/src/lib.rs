//! # spool-label
//!
//! Label template and print-layout engine for filament inventory labels.
//!
//! ## Scope
//!
//! This crate turns entity records into printable labels:
//! - Tag resolution into nested records (`filament.vendor.name`, `extra.<key>`)
//! - The label template language (`{tag}`, `{prefix{tag}suffix}`, `**bold**`)
//! - Pagination of rendered labels across paper sheets or label stock
//! - Rasterization and export (PNG, label-exchange XML documents)
//!
//! Fetching records and persisting presets is the caller's job (see
//! `spool-client`). Everything here is synchronous and side-effect free
//! except [`Artifact::write_to`].
//!
//! ## Example
//!
//! ```ignore
//! use spool_label::{export, paginate, render_items, ExportFormat, ExportOptions, LinkContext};
//! use tokio_util::sync::CancellationToken;
//!
//! let items = render_items(&records, &preset, &LinkContext::default());
//! let pages = paginate(&items, &preset.layout)?;
//! let report = export(&pages, &ExportOptions::from_preset(&preset, ExportFormat::Png, 300.0), &CancellationToken::new());
//! for artifact in &report.artifacts {
//!     artifact.write_to(out_dir)?;
//! }
//! ```

mod error;
pub mod exchange;
pub mod export;
pub mod item;
pub mod layout;
pub mod raster;
pub mod tag;
pub mod template;

// Re-exports
pub use error::{ExportError, ExportResult, LayoutError, LayoutResult};
pub use export::{Artifact, ExportFailure, ExportFormat, ExportOptions, ExportReport, export};
pub use item::{ItemKey, LinkContext, RenderedItem, entity_link, render_item, render_items, slug};
pub use layout::{Page, Rect, Slot, item_size, paginate};
pub use tag::{Resolved, TagValue, resolve};
pub use template::{Fragment, render, substitute};
