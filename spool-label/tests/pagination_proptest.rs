//! Property-based tests for pagination.
//! Page counts and slot order hold for every grid shape, copy count and skip.

use shared::models::{EntityKind, LayoutConfig, PaperSize};
use spool_label::{Fragment, ItemKey, RenderedItem, paginate};

fn items(n: usize) -> Vec<RenderedItem> {
    (0..n)
        .map(|i| RenderedItem {
            key: ItemKey {
                kind: EntityKind::Filament,
                id: i.to_string(),
            },
            label: format!("filament {}", i),
            fragments: vec![Fragment::plain(i.to_string())],
        })
        .collect()
}

fn config(columns: u32, rows: u32, copies: u32, skip: u32) -> LayoutConfig {
    let mut config = LayoutConfig::grid(PaperSize::A3, columns, rows);
    config.item_copies = copies;
    config.skip_items = skip;
    config
}

proptest::proptest! {
    /// Page count is ceil((n * copies + skip) / per_page).
    #[test]
    fn page_count_is_exact(
        n in 0usize..40,
        columns in 1u32..6,
        rows in 1u32..8,
        copies in 1u32..4,
        skip in 0u32..10,
    ) {
        let config = config(columns, rows, copies, skip);
        let pages = paginate(&items(n), &config).unwrap();
        let per_page = (columns * rows) as usize;
        let total = n * copies as usize + skip as usize;
        assert_eq!(pages.len(), total.div_ceil(per_page));

        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.number, i + 1);
            if i + 1 < pages.len() {
                assert_eq!(page.slots.len(), per_page);
            } else {
                assert_eq!(page.slots.len(), total - per_page * i);
            }
        }
    }

    /// Slots hold `skip` blanks, then every item `copies` times in order.
    #[test]
    fn slot_sequence_preserves_order(
        n in 0usize..20,
        copies in 1u32..4,
        skip in 0u32..5,
    ) {
        let config = config(4, 5, copies, skip);
        let pages = paginate(&items(n), &config).unwrap();
        let sequence: Vec<Option<String>> = pages
            .iter()
            .flat_map(|p| &p.slots)
            .map(|s| s.item.as_ref().map(|i| i.key.id.clone()))
            .collect();

        let mut expected = vec![None; skip as usize];
        for i in 0..n {
            for _ in 0..copies {
                expected.push(Some(i.to_string()));
            }
        }
        assert_eq!(sequence, expected);
    }

    /// Cells never leave the page and content stays inside its cell.
    #[test]
    fn cells_inside_page(columns in 1u32..6, rows in 1u32..8) {
        let config = config(columns, rows, 1, 0);
        let pages = paginate(&items((columns * rows) as usize), &config).unwrap();
        let page = &pages[0];
        for slot in &page.slots {
            let (c, k) = (slot.cell, slot.content);
            assert!(c.x >= 0.0 && c.y >= 0.0);
            assert!(c.x + c.width <= page.width + 1e-3);
            assert!(c.y + c.height <= page.height + 1e-3);
            assert!(k.x >= c.x && k.y >= c.y);
            assert!(k.x + k.width <= c.x + c.width + 1e-3);
            assert!(k.y + k.height <= c.y + c.height + 1e-3);
        }
    }
}
