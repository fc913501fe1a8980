//! Print layout geometry
//!
//! All lengths are millimetres.

use serde::{Deserialize, Serialize};

/// Per-edge lengths
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub right: f32,
}

impl Edges {
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }

    /// Per-edge `max(self - other, 0)`
    ///
    /// Used for the part of the printer's unprintable border that the sheet
    /// margin does not already cover.
    pub fn excess_over(&self, other: &Edges) -> Edges {
        Edges {
            top: (self.top - other.top).max(0.0),
            bottom: (self.bottom - other.bottom).max(0.0),
            left: (self.left - other.left).max(0.0),
            right: (self.right - other.right).max(0.0),
        }
    }

    fn all(&self) -> [f32; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

/// Gaps between items
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    #[serde(default)]
    pub horizontal: f32,
    #[serde(default)]
    pub vertical: f32,
}

/// Named paper sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f32,
        height: f32,
    },
}

impl PaperSize {
    /// Portrait `(width, height)` in mm
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            Self::A3 => (297.0, 420.0),
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::Tabloid => (279.4, 431.8),
            Self::Custom { width, height } => (*width, *height),
        }
    }
}

/// How items are arranged on the physical medium
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PaperFormat {
    /// A `columns x rows` grid on a sheet of paper
    Grid {
        #[serde(default)]
        paper: PaperSize,
        columns: u32,
        rows: u32,
    },
    /// Die-cut label stock, one item per page of the given size
    Label { width: f32, height: f32 },
}

impl Default for PaperFormat {
    fn default() -> Self {
        Self::Grid {
            paper: PaperSize::A4,
            columns: 3,
            rows: 8,
        }
    }
}

/// Which outlines the page raster draws
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    #[default]
    None,
    /// Outline around every occupied item
    Border,
    /// Outline around every slot, empty or not
    Grid,
}

/// Physical geometry for one print job
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub paper: PaperFormat,
    #[serde(default = "default_margin")]
    pub margin: Edges,
    #[serde(default = "default_printer_margin")]
    pub printer_margin: Edges,
    #[serde(default)]
    pub spacing: Spacing,
    #[serde(default)]
    pub skip_items: u32,
    #[serde(default = "default_copies")]
    pub item_copies: u32,
    #[serde(default)]
    pub border: BorderMode,
}

fn default_margin() -> Edges {
    Edges::uniform(10.0)
}

fn default_printer_margin() -> Edges {
    Edges::uniform(5.0)
}

fn default_copies() -> u32 {
    1
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            paper: PaperFormat::default(),
            margin: default_margin(),
            printer_margin: default_printer_margin(),
            spacing: Spacing::default(),
            skip_items: 0,
            item_copies: 1,
            border: BorderMode::None,
        }
    }
}

impl LayoutConfig {
    /// Single-label stock of the given size, no margins
    pub fn label_stock(width: f32, height: f32) -> Self {
        Self {
            paper: PaperFormat::Label { width, height },
            margin: Edges::default(),
            printer_margin: Edges::default(),
            ..Self::default()
        }
    }

    /// Grid of `columns x rows` on the given paper
    pub fn grid(paper: PaperSize, columns: u32, rows: u32) -> Self {
        Self {
            paper: PaperFormat::Grid {
                paper,
                columns,
                rows,
            },
            ..Self::default()
        }
    }

    /// `(columns, rows)`; label stock is a 1x1 grid
    pub fn grid_shape(&self) -> (u32, u32) {
        match self.paper {
            PaperFormat::Grid { columns, rows, .. } => (columns, rows),
            PaperFormat::Label { .. } => (1, 1),
        }
    }

    /// Physical page size `(width, height)` in mm
    pub fn page_size(&self) -> (f32, f32) {
        match self.paper {
            PaperFormat::Grid { paper, .. } => paper.dimensions(),
            PaperFormat::Label { width, height } => (width, height),
        }
    }

    pub fn items_per_page(&self) -> usize {
        let (columns, rows) = self.grid_shape();
        columns as usize * rows as usize
    }

    /// True when every length is finite and non-negative
    pub fn lengths_are_sane(&self) -> bool {
        let (w, h) = self.page_size();
        [w, h, self.spacing.horizontal, self.spacing.vertical]
            .into_iter()
            .chain(self.margin.all())
            .chain(self.printer_margin.all())
            .all(|v| v.is_finite() && v >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excess_never_negative() {
        let margin = Edges {
            top: 10.0,
            bottom: 2.0,
            left: 5.0,
            right: 5.0,
        };
        let printer = Edges {
            top: 4.0,
            bottom: 6.0,
            left: 5.0,
            right: 7.5,
        };
        let excess = printer.excess_over(&margin);
        assert_eq!(excess.top, 0.0);
        assert_eq!(excess.bottom, 4.0);
        assert_eq!(excess.left, 0.0);
        assert_eq!(excess.right, 2.5);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{ "paper": { "mode": "grid", "paper": { "name": "Letter" }, "columns": 2, "rows": 5 } }"#;
        let config: LayoutConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.grid_shape(), (2, 5));
        assert_eq!(config.page_size(), (215.9, 279.4));
        assert_eq!(config.item_copies, 1);
        assert_eq!(config.margin, Edges::uniform(10.0));
    }

    #[test]
    fn test_label_stock_shape() {
        let config = LayoutConfig::label_stock(62.0, 29.0);
        assert_eq!(config.items_per_page(), 1);
        assert_eq!(config.page_size(), (62.0, 29.0));
    }

    #[test]
    fn test_custom_paper_roundtrip() {
        let config = LayoutConfig::grid(
            PaperSize::Custom {
                width: 100.0,
                height: 150.0,
            },
            1,
            3,
        );
        let json = serde_json::to_string(&config).unwrap();
        let back: LayoutConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_negative_lengths_flagged() {
        let mut config = LayoutConfig::default();
        assert!(config.lengths_are_sane());
        config.spacing.vertical = -1.0;
        assert!(!config.lengths_are_sane());
    }
}
