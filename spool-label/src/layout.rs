//! Layout engine
//!
//! Tiles rendered items across pages. Lengths are millimetres with the origin
//! at the top-left corner of the page.
//!
//! Grid geometry for `columns` items across a sheet:
//!
//! ```text
//! item_width = (paper_width - margin.left - margin.right - spacing.horizontal) / columns
//!              - spacing.horizontal
//! x(column)  = margin.left + spacing.horizontal + column * (item_width + spacing.horizontal)
//! ```
//!
//! (rows are symmetric). Where the printer cannot print as close to the
//! sheet edge as the margin assumes, the difference is padded inside the
//! cells that touch that edge; interior cells are unaffected.

use serde::{Deserialize, Serialize};
use shared::models::{Edges, LayoutConfig, PaperFormat};
use tracing::debug;

use crate::error::{LayoutError, LayoutResult};
use crate::item::RenderedItem;

/// Axis-aligned rectangle in mm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn inset(&self, edges: &Edges) -> Rect {
        Rect {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: self.width - edges.left - edges.right,
            height: self.height - edges.top - edges.bottom,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// One position on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub column: u32,
    pub row: u32,
    /// Full cell
    pub cell: Rect,
    /// Cell minus printer padding, where the label is drawn
    pub content: Rect,
    /// `None` for skipped positions
    pub item: Option<RenderedItem>,
}

/// One physical page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub width: f32,
    pub height: f32,
    pub slots: Vec<Slot>,
}

impl Page {
    pub fn items(&self) -> impl Iterator<Item = &RenderedItem> {
        self.slots.iter().filter_map(|s| s.item.as_ref())
    }
}

/// Most columns or rows on one sheet
pub const MAX_GRID_SIDE: u32 = 100;
/// Most copies of one item
pub const MAX_ITEM_COPIES: u32 = 1000;
/// Most leading empty slots
pub const MAX_SKIP_ITEMS: u32 = 10_000;

/// Size `(width, height)` of one grid cell
///
/// Fails on zero columns/rows/copies, counts above the `MAX_*` limits,
/// negative or non-finite lengths, and when margins and spacing leave no
/// positive room.
pub fn item_size(config: &LayoutConfig) -> LayoutResult<(f32, f32)> {
    let (columns, rows) = config.grid_shape();
    if columns == 0 || rows == 0 {
        return Err(LayoutError::InvalidConfig(format!(
            "grid must have at least one column and row, got {}x{}",
            columns, rows
        )));
    }
    if columns > MAX_GRID_SIDE || rows > MAX_GRID_SIDE {
        return Err(LayoutError::InvalidConfig(format!(
            "grid of {}x{} exceeds {} per side",
            columns, rows, MAX_GRID_SIDE
        )));
    }
    if config.item_copies == 0 || config.item_copies > MAX_ITEM_COPIES {
        return Err(LayoutError::InvalidConfig(format!(
            "item copies must be within 1..={}, got {}",
            MAX_ITEM_COPIES, config.item_copies
        )));
    }
    if config.skip_items > MAX_SKIP_ITEMS {
        return Err(LayoutError::InvalidConfig(format!(
            "cannot skip more than {} slots, got {}",
            MAX_SKIP_ITEMS, config.skip_items
        )));
    }
    if !config.lengths_are_sane() {
        return Err(LayoutError::InvalidConfig(
            "lengths must be finite and non-negative".to_string(),
        ));
    }

    let (page_w, page_h) = config.page_size();
    let m = &config.margin;
    let (width, height) = match config.paper {
        PaperFormat::Grid { .. } => {
            let sh = config.spacing.horizontal;
            let sv = config.spacing.vertical;
            (
                (page_w - m.left - m.right - sh) / columns as f32 - sh,
                (page_h - m.top - m.bottom - sv) / rows as f32 - sv,
            )
        }
        PaperFormat::Label { .. } => (page_w - m.left - m.right, page_h - m.top - m.bottom),
    };

    if width <= 0.0 || height <= 0.0 {
        return Err(LayoutError::DegenerateGeometry(format!(
            "computed item size {:.2} x {:.2} mm is not positive",
            width, height
        )));
    }
    Ok((width, height))
}

/// Partition `items` into pages and place every slot
///
/// Each item is repeated `item_copies` times, then `skip_items` empty slots
/// are put in front. Every page except the last holds exactly
/// `columns * rows` slots.
pub fn paginate(items: &[RenderedItem], config: &LayoutConfig) -> LayoutResult<Vec<Page>> {
    let (item_w, item_h) = item_size(config)?;
    let (columns, rows) = config.grid_shape();
    let (page_w, page_h) = config.page_size();
    let padding = config.printer_margin.excess_over(&config.margin);
    let per_page = config.items_per_page();

    let (origin_x, origin_y, step_x, step_y) = match config.paper {
        PaperFormat::Grid { .. } => (
            config.margin.left + config.spacing.horizontal,
            config.margin.top + config.spacing.vertical,
            item_w + config.spacing.horizontal,
            item_h + config.spacing.vertical,
        ),
        PaperFormat::Label { .. } => (config.margin.left, config.margin.top, 0.0, 0.0),
    };

    // Outer cells lose the most to padding; a single column or row loses both sides.
    let pad_x = if columns == 1 {
        padding.left + padding.right
    } else {
        padding.left.max(padding.right)
    };
    let pad_y = if rows == 1 {
        padding.top + padding.bottom
    } else {
        padding.top.max(padding.bottom)
    };
    if item_w - pad_x <= 0.0 || item_h - pad_y <= 0.0 {
        return Err(LayoutError::DegenerateGeometry(format!(
            "printer margin leaves no room in {:.2} x {:.2} mm cells",
            item_w, item_h
        )));
    }

    let slot_at = |index: usize, item: Option<&RenderedItem>| {
        let column = (index % columns as usize) as u32;
        let row = (index / columns as usize) as u32;
        let cell = Rect {
            x: origin_x + column as f32 * step_x,
            y: origin_y + row as f32 * step_y,
            width: item_w,
            height: item_h,
        };
        let edge_padding = Edges {
            top: if row == 0 { padding.top } else { 0.0 },
            bottom: if row == rows - 1 { padding.bottom } else { 0.0 },
            left: if column == 0 { padding.left } else { 0.0 },
            right: if column == columns - 1 { padding.right } else { 0.0 },
        };
        Slot {
            column,
            row,
            cell,
            content: cell.inset(&edge_padding),
            item: item.cloned(),
        }
    };

    let expanded: Vec<Option<&RenderedItem>> = std::iter::repeat_n(None, config.skip_items as usize)
        .chain(items.iter().flat_map(|item| {
            std::iter::repeat_n(Some(item), config.item_copies as usize)
        }))
        .collect();

    let pages: Vec<Page> = expanded
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            width: page_w,
            height: page_h,
            slots: chunk
                .iter()
                .enumerate()
                .map(|(index, item)| slot_at(index, *item))
                .collect(),
        })
        .collect();

    debug!(
        items = items.len(),
        slots = expanded.len(),
        pages = pages.len(),
        item_width = item_w,
        item_height = item_h,
        "paginated"
    );
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKey;
    use crate::template::Fragment;
    use shared::models::{EntityKind, PaperSize, Spacing};

    fn item(id: u32) -> RenderedItem {
        RenderedItem {
            key: ItemKey {
                kind: EntityKind::Spool,
                id: id.to_string(),
            },
            label: format!("spool {}", id),
            fragments: vec![Fragment::plain(format!("#{}", id))],
        }
    }

    fn items(n: u32) -> Vec<RenderedItem> {
        (1..=n).map(item).collect()
    }

    fn ids(page: &Page) -> Vec<Option<String>> {
        page.slots
            .iter()
            .map(|s| s.item.as_ref().map(|i| i.key.id.clone()))
            .collect()
    }

    #[test]
    fn test_three_by_two_with_skip() {
        let mut config = LayoutConfig::grid(PaperSize::A4, 3, 2);
        config.skip_items = 1;

        let pages = paginate(&items(5), &config).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(
            ids(&pages[0]),
            vec![
                None,
                Some("1".into()),
                Some("2".into()),
                Some("3".into()),
                Some("4".into()),
                Some("5".into()),
            ]
        );
    }

    #[test]
    fn test_copies_and_partial_last_page() {
        let mut config = LayoutConfig::grid(PaperSize::A4, 2, 2);
        config.item_copies = 3;

        let pages = paginate(&items(2), &config).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].slots.len(), 4);
        assert_eq!(pages[1].slots.len(), 2);
        assert_eq!(
            ids(&pages[0]),
            vec![
                Some("1".into()),
                Some("1".into()),
                Some("1".into()),
                Some("2".into()),
            ]
        );
        assert_eq!(pages[1].number, 2);
    }

    #[test]
    fn test_item_size_formula() {
        let mut config = LayoutConfig::grid(PaperSize::A4, 3, 8);
        config.margin = Edges::uniform(10.0);
        config.spacing = Spacing {
            horizontal: 2.0,
            vertical: 1.0,
        };
        let (w, h) = item_size(&config).unwrap();
        assert!((w - ((210.0 - 20.0 - 2.0) / 3.0 - 2.0)).abs() < 1e-4);
        assert!((h - ((297.0 - 20.0 - 1.0) / 8.0 - 1.0)).abs() < 1e-4);
    }

    #[test]
    fn test_cell_positions() {
        let mut config = LayoutConfig::grid(PaperSize::A4, 2, 2);
        config.margin = Edges::uniform(10.0);
        config.printer_margin = Edges::default();
        config.spacing = Spacing {
            horizontal: 4.0,
            vertical: 0.0,
        };
        let pages = paginate(&items(4), &config).unwrap();
        let slots = &pages[0].slots;
        // (210 - 20 - 4) / 2 - 4 = 89
        assert_eq!(slots[0].cell.x, 14.0);
        assert_eq!(slots[1].cell.x, 14.0 + 89.0 + 4.0);
        assert_eq!(slots[1].cell.width, 89.0);
        assert_eq!(slots[2].row, 1);
        assert_eq!(slots[2].cell.y, 10.0 + 138.5);
        // Last column ends one spacing before the right margin.
        assert_eq!(slots[1].cell.x + slots[1].cell.width, 210.0 - 10.0 - 4.0);
    }

    #[test]
    fn test_printer_padding_only_on_outer_edges() {
        let mut config = LayoutConfig::grid(PaperSize::A4, 3, 3);
        config.margin = Edges {
            top: 2.0,
            bottom: 2.0,
            left: 2.0,
            right: 8.0,
        };
        config.printer_margin = Edges::uniform(5.0);

        let pages = paginate(&items(9), &config).unwrap();
        let slots = &pages[0].slots;

        let pad = |s: &Slot| {
            [
                s.content.y - s.cell.y,
                (s.cell.y + s.cell.height) - (s.content.y + s.content.height),
                s.content.x - s.cell.x,
                (s.cell.x + s.cell.width) - (s.content.x + s.content.width),
            ]
        };
        let assert_pad = |s: &Slot, expected: [f32; 4]| {
            for (got, want) in pad(s).into_iter().zip(expected) {
                assert!((got - want).abs() < 1e-3, "padding {:?} != {:?}", pad(s), expected);
            }
        };

        // top-left corner: top and left get 3mm, right margin already covers the printer.
        assert_pad(&slots[0], [3.0, 0.0, 3.0, 0.0]);
        // interior cell gets nothing
        assert_pad(&slots[4], [0.0, 0.0, 0.0, 0.0]);
        // bottom-right corner: bottom 3mm, right 0 (8 >= 5)
        assert_pad(&slots[8], [0.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_label_stock_one_per_page() {
        let mut config = LayoutConfig::label_stock(62.0, 29.0);
        config.margin = Edges::uniform(1.0);
        config.printer_margin = Edges::uniform(1.5);

        let pages = paginate(&items(3), &config).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!((pages[0].width, pages[0].height), (62.0, 29.0));
        let slot = &pages[2].slots[0];
        assert_eq!(slot.cell, Rect { x: 1.0, y: 1.0, width: 60.0, height: 27.0 });
        assert_eq!(slot.content, Rect { x: 1.5, y: 1.5, width: 59.0, height: 26.0 });
    }

    #[test]
    fn test_degenerate_geometry_rejected() {
        let mut config = LayoutConfig::grid(PaperSize::A5, 4, 4);
        config.margin = Edges::uniform(80.0);
        assert!(matches!(
            paginate(&items(1), &config),
            Err(LayoutError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_printer_margin_eating_cell_rejected() {
        let mut config = LayoutConfig::label_stock(10.0, 10.0);
        config.printer_margin = Edges::uniform(5.0);
        assert!(matches!(
            paginate(&items(1), &config),
            Err(LayoutError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_zero_columns_rejected() {
        let config = LayoutConfig::grid(PaperSize::A4, 0, 3);
        assert!(matches!(
            paginate(&items(1), &config),
            Err(LayoutError::InvalidConfig(_))
        ));

        let mut config = LayoutConfig::grid(PaperSize::A4, 2, 3);
        config.item_copies = 0;
        assert!(matches!(item_size(&config), Err(LayoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_counts_rejected() {
        let mut config = LayoutConfig::grid(PaperSize::A4, 50_000, 50_000);
        config.margin = Edges::default();
        config.printer_margin = Edges::default();
        config.spacing = Spacing::default();
        assert!(matches!(
            paginate(&[], &config),
            Err(LayoutError::InvalidConfig(_))
        ));

        let mut config = LayoutConfig::grid(PaperSize::A4, 3, 3);
        config.item_copies = MAX_ITEM_COPIES + 1;
        assert!(matches!(item_size(&config), Err(LayoutError::InvalidConfig(_))));

        let mut config = LayoutConfig::grid(PaperSize::A4, 3, 3);
        config.skip_items = u32::MAX;
        assert!(matches!(
            paginate(&items(1), &config),
            Err(LayoutError::InvalidConfig(_))
        ));

        let config = LayoutConfig::grid(PaperSize::A4, MAX_GRID_SIDE, MAX_GRID_SIDE);
        assert!(item_size(&config).is_ok());
    }

    #[test]
    fn test_empty_input() {
        let config = LayoutConfig::default();
        assert!(paginate(&[], &config).unwrap().is_empty());

        let mut config = LayoutConfig::default();
        config.skip_items = 2;
        let pages = paginate(&[], &config).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].slots.len(), 2);
        assert_eq!(pages[0].items().count(), 0);
    }

    #[test]
    fn test_deterministic() {
        let mut config = LayoutConfig::grid(PaperSize::Letter, 4, 10);
        config.skip_items = 7;
        config.item_copies = 2;
        let a = paginate(&items(31), &config).unwrap();
        let b = paginate(&items(31), &config).unwrap();
        assert_eq!(a, b);
    }
}
