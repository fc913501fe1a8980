//! Label template language
//!
//! ```text
//! **{filament.vendor.name} - {filament.name}**
//! #{id} - {filament.material}
//! {Lot Nr: {lot_nr}}
//! ```
//!
//! - `{tag}` is replaced by the resolved value, or nothing when unresolved.
//! - `{prefix{tag}suffix}` is a conditional group: dropped entirely when the
//!   tag is unresolved, otherwise `prefix + value + suffix`.
//! - `**text**` is bold, applied after substitution.
//! - Newlines become line breaks.
//!
//! Parsing is lenient. Groups nested deeper than two levels, unmatched `{`
//! and stray `}` stay in the output as literal text so a half-edited
//! template still previews.

use serde::{Deserialize, Serialize};
use shared::models::Record;

use crate::tag::{Resolved, resolve};

/// One display fragment of a rendered label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fragment {
    Text { text: String, bold: bool },
    LineBreak,
}

impl Fragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: true,
        }
    }
}

/// Render `template` against `record` into display fragments
pub fn render(template: &str, record: &Record) -> Vec<Fragment> {
    markup(&substitute(template, record))
}

/// Replace every tag group in `template` with its resolved text
pub fn substitute(template: &str, record: &Record) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match group_len(tail) {
            Some(len) => {
                expand_group(&tail[..len], record, &mut out);
                rest = &tail[len..];
            }
            None => {
                // Unmatched `{`: keep it and scan on, later groups still expand.
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Split substituted text into bold/plain runs and lines
///
/// Odd-indexed segments between `**` delimiters are bold.
pub fn markup(text: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    for (i, segment) in text.split("**").enumerate() {
        let bold = i % 2 == 1;
        for (j, line) in segment.split('\n').enumerate() {
            if j > 0 {
                fragments.push(Fragment::LineBreak);
            }
            let line = line.strip_suffix('\r').unwrap_or(line);
            if !line.is_empty() {
                fragments.push(Fragment::Text {
                    text: line.to_string(),
                    bold,
                });
            }
        }
    }
    fragments
}

/// Byte length of the balanced `{...}` group at the start of `s`
fn group_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn expand_group(span: &str, record: &Record, out: &mut String) {
    let inner = &span[1..span.len() - 1];
    match span.matches('{').count() {
        1 => {
            if let Resolved::Found(value) = resolve(inner, record) {
                out.push_str(&value.to_string());
            }
        }
        2 => {
            // Two braces in a balanced span can only be `{prefix{tag}suffix}`.
            let (Some(open), Some(close)) = (inner.find('{'), inner.find('}')) else {
                out.push_str(span);
                return;
            };
            let (prefix, tag, suffix) = (&inner[..open], &inner[open + 1..close], &inner[close + 1..]);
            if let Resolved::Found(value) = resolve(tag, record) {
                out.push_str(prefix);
                out.push_str(&value.to_string());
                out.push_str(suffix);
            }
        }
        _ => out.push_str(span),
    }
}
