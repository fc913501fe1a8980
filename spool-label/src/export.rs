//! Export pipeline
//!
//! Turns laid-out pages into files: one PNG or exchange document per unique
//! entity, or one per page. A failing item is recorded in the report and the
//! batch moves on.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use shared::models::{BorderMode, LabelPreset};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::{ExportError, ExportResult};
use crate::exchange::write_document;
use crate::item::{ItemKey, RenderedItem, slug};
use crate::layout::Page;
use crate::raster::{RasterSpec, encode_png, rasterize_item, rasterize_page};

/// Output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Png,
    /// XML label-exchange document with an embedded PNG
    ExchangeDocument,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::ExchangeDocument => "label",
        }
    }
}

/// Parameters of one export batch
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub dpi: f32,
    /// One artifact per page instead of per unique item
    pub per_page: bool,
    /// Nominal text line height in mm
    pub text_size: f32,
    pub threshold: Option<u8>,
    /// Outlines on page rasters
    pub border: BorderMode,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            dpi: 300.0,
            per_page: false,
            text_size: 3.0,
            threshold: None,
            border: BorderMode::None,
        }
    }
}

impl ExportOptions {
    /// Options carrying the preset's flags and border mode
    pub fn from_preset(preset: &LabelPreset, format: ExportFormat, dpi: f32) -> Self {
        Self {
            format,
            dpi,
            per_page: preset.flags.per_page_export,
            text_size: preset.flags.text_size,
            threshold: preset.flags.threshold,
            border: preset.layout.border,
        }
    }

    fn check(&self) -> ExportResult<()> {
        if !self.text_size.is_finite() || self.text_size <= 0.0 {
            return Err(ExportError::InvalidOptions(format!(
                "text size must be a positive length, got {}",
                self.text_size
            )));
        }
        Ok(())
    }

    fn raster_spec(&self) -> RasterSpec {
        RasterSpec {
            threshold: self.threshold,
            ..RasterSpec::for_dpi(self.dpi, self.text_size)
        }
    }
}

/// One produced file, held in memory
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Entity behind the artifact; `None` for page exports
    pub key: Option<ItemKey>,
    pub width_px: u32,
    pub height_px: u32,
}

impl Artifact {
    /// Write into `dir`, returning the full path
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// An item or page that produced no artifact
#[derive(Debug)]
pub struct ExportFailure {
    /// Item key or `page N`
    pub subject: String,
    pub error: ExportError,
}

/// Outcome of an export batch
#[derive(Debug, Default)]
pub struct ExportReport {
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<ExportFailure>,
    /// The batch stopped early; `artifacts` holds what was done by then
    pub cancelled: bool,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failures.is_empty()
    }

    fn fail(&mut self, subject: String, error: ExportError) {
        warn!(subject = %subject, error = %error, "Label export failed");
        self.failures.push(ExportFailure { subject, error });
    }
}

/// Export `pages` according to `options`
///
/// `cancel` is checked before each item or page.
#[instrument(skip_all, fields(pages = pages.len(), format = ?options.format, per_page = options.per_page))]
pub fn export(pages: &[Page], options: &ExportOptions, cancel: &CancellationToken) -> ExportReport {
    if let Err(error) = options.check() {
        let mut report = ExportReport::default();
        report.fail("options".to_string(), error);
        return report;
    }

    let spec = options.raster_spec();
    let report = if options.per_page {
        export_pages(pages, options, &spec, cancel)
    } else {
        export_items(pages, options, &spec, cancel)
    };

    info!(
        artifacts = report.artifacts.len(),
        failures = report.failures.len(),
        cancelled = report.cancelled,
        "Export finished"
    );
    report
}

fn export_items(
    pages: &[Page],
    options: &ExportOptions,
    spec: &RasterSpec,
    cancel: &CancellationToken,
) -> ExportReport {
    let mut report = ExportReport::default();
    let mut seen: HashSet<&ItemKey> = HashSet::new();
    let mut names: HashMap<String, &ItemKey> = HashMap::new();

    let slots = pages
        .iter()
        .flat_map(|page| &page.slots)
        .filter_map(|slot| slot.item.as_ref().map(|item| (item, slot.cell)));

    // Per-item files are the physical label: the whole cell, no printer padding.
    for (item, cell) in slots {
        if !seen.insert(&item.key) {
            continue;
        }
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let file_name = format!("{}.{}", slug(&item.label), options.format.extension());
        if let Some(owner) = names.get(&file_name) {
            let error = ExportError::NameCollision(format!("{} (taken by {})", file_name, owner));
            report.fail(item.key.to_string(), error);
            continue;
        }

        match export_item(item, (cell.width, cell.height), options, spec) {
            Ok((bytes, (width_px, height_px))) => {
                debug!(key = %item.key, file = %file_name, "Item exported");
                names.insert(file_name.clone(), &item.key);
                report.artifacts.push(Artifact {
                    file_name,
                    bytes,
                    key: Some(item.key.clone()),
                    width_px,
                    height_px,
                });
            }
            Err(error) => report.fail(item.key.to_string(), error),
        }
    }
    report
}

fn export_item(
    item: &RenderedItem,
    size: (f32, f32),
    options: &ExportOptions,
    spec: &RasterSpec,
) -> ExportResult<(Vec<u8>, (u32, u32))> {
    let image = rasterize_item(item, size, spec)?;
    encode(&image, size, options.format)
}

fn export_pages(
    pages: &[Page],
    options: &ExportOptions,
    spec: &RasterSpec,
    cancel: &CancellationToken,
) -> ExportReport {
    let mut report = ExportReport::default();
    for page in pages {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let subject = format!("page {}", page.number);
        let result = rasterize_page(page, options.border, spec)
            .and_then(|image| encode(&image, (page.width, page.height), options.format));
        match result {
            Ok((bytes, (width_px, height_px))) => {
                report.artifacts.push(Artifact {
                    file_name: format!("page-{}.{}", page.number, options.format.extension()),
                    bytes,
                    key: None,
                    width_px,
                    height_px,
                });
            }
            Err(error) => report.fail(subject, error),
        }
    }
    report
}

fn encode(image: &RgbaImage, size: (f32, f32), format: ExportFormat) -> ExportResult<(Vec<u8>, (u32, u32))> {
    let bytes = match format {
        ExportFormat::Png => encode_png(image)?,
        ExportFormat::ExchangeDocument => write_document(size.0, size.1, image)?,
    };
    Ok((bytes, image.dimensions()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::paginate;
    use crate::template::Fragment;
    use shared::error::ErrorCode;
    use shared::models::{EntityKind, LayoutConfig, PaperSize, PresetFlags};

    fn item(id: &str, label: &str) -> RenderedItem {
        RenderedItem {
            key: ItemKey {
                kind: EntityKind::Spool,
                id: id.into(),
            },
            label: label.into(),
            fragments: vec![Fragment::plain(format!("#{}", id))],
        }
    }

    fn options() -> ExportOptions {
        ExportOptions {
            dpi: 96.0,
            ..ExportOptions::default()
        }
    }

    #[test]
    fn test_copies_deduplicated() {
        let mut config = LayoutConfig::grid(PaperSize::A4, 3, 8);
        config.item_copies = 3;
        let pages = paginate(&[item("1", "spool 1"), item("2", "spool 2")], &config).unwrap();

        let report = export(&pages, &options(), &CancellationToken::new());
        assert!(report.is_complete());
        let names: Vec<_> = report.artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, ["spool-1.png", "spool-2.png"]);
    }

    #[test]
    fn test_slug_collision_skipped_and_reported() {
        let config = LayoutConfig::label_stock(40.0, 20.0);
        let pages = paginate(&[item("1", "Spool 1"), item("2", "spool-1")], &config).unwrap();

        let report = export(&pages, &options(), &CancellationToken::new());
        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].subject, "spool-2");
        assert!(matches!(report.failures[0].error, ExportError::NameCollision(_)));
    }

    #[test]
    fn test_cancelled_before_start() {
        let config = LayoutConfig::label_stock(40.0, 20.0);
        let pages = paginate(&[item("1", "a"), item("2", "b")], &config).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = export(&pages, &options(), &cancel);
        assert!(report.cancelled);
        assert!(report.artifacts.is_empty());
        assert!(!report.is_complete());
    }

    #[test]
    fn test_zero_pixel_item_reported() {
        // Positive in mm but rounds to zero pixels.
        let config = LayoutConfig::label_stock(0.1, 20.0);
        let pages = paginate(&[item("1", "a"), item("2", "b")], &config).unwrap();

        let report = export(&pages, &options(), &CancellationToken::new());
        assert!(report.artifacts.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.error, ExportError::ZeroSized(_))));
    }

    #[test]
    fn test_per_page_export() {
        let config = LayoutConfig::grid(PaperSize::A5, 2, 2);
        let items: Vec<_> = (1..=5).map(|i| item(&i.to_string(), &format!("s{}", i))).collect();
        let pages = paginate(&items, &config).unwrap();

        let opts = ExportOptions {
            per_page: true,
            format: ExportFormat::ExchangeDocument,
            ..options()
        };
        let report = export(&pages, &opts, &CancellationToken::new());
        let names: Vec<_> = report.artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, ["page-1.label", "page-2.label"]);
        assert!(report.artifacts.iter().all(|a| a.key.is_none()));
    }

    #[test]
    fn test_item_artifact_independent_of_slot() {
        let mut config = LayoutConfig::grid(PaperSize::A4, 3, 3);
        config.margin = shared::models::Edges::uniform(2.0);
        config.printer_margin = shared::models::Edges::uniform(6.0);
        let opts = ExportOptions {
            format: ExportFormat::ExchangeDocument,
            ..options()
        };
        let items = [item("1", "spool 1")];

        let corner = export(&paginate(&items, &config).unwrap(), &opts, &CancellationToken::new());
        config.skip_items = 4;
        let centre = export(&paginate(&items, &config).unwrap(), &opts, &CancellationToken::new());

        let (a, b) = (&corner.artifacts[0], &centre.artifacts[0]);
        assert_eq!((a.width_px, a.height_px), (b.width_px, b.height_px));
        assert_eq!(a.bytes, b.bytes);

        let (w, _) = crate::layout::item_size(&config).unwrap();
        assert_eq!(a.width_px, RasterSpec::for_dpi(96.0, 3.0).px(w));
    }

    #[test]
    fn test_invalid_text_size_rejected() {
        let config = LayoutConfig::label_stock(40.0, 20.0);
        let pages = paginate(&[item("1", "a")], &config).unwrap();
        for text_size in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let opts = ExportOptions {
                text_size,
                ..options()
            };
            let report = export(&pages, &opts, &CancellationToken::new());
            assert!(report.artifacts.is_empty());
            assert_eq!(report.failures.len(), 1);
            assert_eq!(
                ErrorCode::from(&report.failures[0].error),
                ErrorCode::ValueOutOfRange
            );
        }
    }

    #[test]
    fn test_pixel_size_follows_dpi() {
        let config = LayoutConfig::label_stock(25.4, 12.7);
        let pages = paginate(&[item("1", "a")], &config).unwrap();
        let opts = ExportOptions {
            dpi: 192.0,
            ..options()
        };
        let report = export(&pages, &opts, &CancellationToken::new());
        let artifact = &report.artifacts[0];
        assert_eq!((artifact.width_px, artifact.height_px), (192, 96));
    }

    #[test]
    fn test_options_from_preset() {
        let preset = LabelPreset::new("thermal", EntityKind::Spool).with_flags(PresetFlags {
            per_page_export: true,
            threshold: Some(160),
            text_size: 4.5,
            ..PresetFlags::default()
        });
        let opts = ExportOptions::from_preset(&preset, ExportFormat::Png, 203.0);
        assert!(opts.per_page);
        assert_eq!(opts.threshold, Some(160));
        assert_eq!(opts.text_size, 4.5);
        assert_eq!(opts.raster_spec().threshold, Some(160));
    }
}
