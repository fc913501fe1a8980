//! Rendered items: one label per entity

use std::fmt;

use serde::{Deserialize, Serialize};
use shared::models::{EntityKind, LabelPreset, Record};

use crate::template::{Fragment, render};

/// Stable identity of the entity behind a rendered item
///
/// Copies made by the layout engine share the key, which is what export
/// de-duplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub kind: EntityKind,
    pub id: String,
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)
    }
}

/// Output of the template renderer for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedItem {
    pub key: ItemKey,
    /// Human-readable name, source of the export file name
    pub label: String,
    pub fragments: Vec<Fragment>,
}

/// How entity links are written when a preset shows them
#[derive(Debug, Clone, Default)]
pub struct LinkContext {
    /// Web root of the inventory UI, needed for full URLs
    pub base_url: Option<String>,
    pub use_full_url: bool,
}

/// Link to an entity: `web+spoolman:s-12`, or `{base}/spool/show/12`
///
/// Falls back to the short form when no base URL is known.
pub fn entity_link(kind: EntityKind, id: &str, links: &LinkContext) -> String {
    match (&links.base_url, links.use_full_url) {
        (Some(base), true) => format!(
            "{}/{}/show/{}",
            base.trim_end_matches('/'),
            kind.path_segment(),
            id
        ),
        _ => format!("web+spoolman:{}-{}", kind.link_prefix(), id),
    }
}

/// Render one record with the preset's template
///
/// `position` identifies records without an `id` field.
pub fn render_item(
    record: &Record,
    position: usize,
    preset: &LabelPreset,
    links: &LinkContext,
) -> RenderedItem {
    let id = match record.id() {
        Some(id) => id.to_string(),
        None => format!("#{}", position),
    };
    let key = ItemKey {
        kind: preset.kind,
        id,
    };

    let mut fragments = render(&preset.template, record);
    if preset.flags.show_link {
        if !fragments.is_empty() {
            fragments.push(Fragment::LineBreak);
        }
        fragments.push(Fragment::plain(entity_link(key.kind, &key.id, links)));
    }

    RenderedItem {
        label: item_label(preset.kind, &key.id, record),
        key,
        fragments,
    }
}

/// Render every record, in order
pub fn render_items(
    records: &[Record],
    preset: &LabelPreset,
    links: &LinkContext,
) -> Vec<RenderedItem> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| render_item(record, i, preset, links))
        .collect()
}

fn item_label(kind: EntityKind, id: &str, record: &Record) -> String {
    let names: Vec<&str> = match kind {
        EntityKind::Spool => vec![
            record.text_at("filament.vendor.name").unwrap_or_default(),
            record.text_at("filament.name").unwrap_or_default(),
        ],
        EntityKind::Filament => vec![
            record.text_at("vendor.name").unwrap_or_default(),
            record.text_at("name").unwrap_or_default(),
        ],
        EntityKind::Vendor => vec![record.text_at("name").unwrap_or_default()],
    };

    let mut label = format!("{} {}", kind, id);
    for name in names.into_iter().filter(|n| !n.is_empty()) {
        label.push(' ');
        label.push_str(name);
    }
    label
}

/// File-name-safe slug: lowercase ASCII alphanumerics joined by `-`
pub fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_dash = false;
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        out.push_str("label");
    }
    out
}
