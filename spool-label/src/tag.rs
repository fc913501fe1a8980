//! Tag resolution
//!
//! A tag is a dotted path into an entity record, e.g. `filament.vendor.name`
//! or `extra.location`. Resolution never fails; a miss is
//! [`Resolved::NotFound`].

use std::fmt;

use shared::models::{DecodedValue, FieldValue, Record};

/// Outcome of resolving a tag against a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    Found(TagValue<'a>),
    NotFound,
}

impl<'a> Resolved<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn value(self) -> Option<TagValue<'a>> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotFound => None,
        }
    }
}

/// A resolved primitive value, borrowed from the record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TagValue<'a> {
    Field(&'a FieldValue),
    Extra(&'a DecodedValue),
}

/// Resolve `path` against `record`
///
/// - `extra.<key>` looks up the record's decoded extra fields.
/// - Otherwise the first segment is a field; nested records are descended
///   into with the remaining path.
/// - Missing fields, `null` values and paths ending on a nested record are
///   `NotFound`. Segments left over after reaching a primitive are ignored.
pub fn resolve<'a>(path: &str, record: &'a Record) -> Resolved<'a> {
    let path = path.trim();
    let (first, rest) = match path.split_once('.') {
        Some((first, rest)) => (first, Some(rest)),
        None => (path, None),
    };

    if first == "extra" {
        let key = rest.and_then(|r| r.split('.').next()).unwrap_or_default();
        return match record.extra.get(key) {
            Some(value) => Resolved::Found(TagValue::Extra(value)),
            None => Resolved::NotFound,
        };
    }

    match record.fields.get(first) {
        None | Some(FieldValue::Null) => Resolved::NotFound,
        Some(FieldValue::Record(inner)) => match rest {
            Some(rest) => resolve(rest, inner),
            None => Resolved::NotFound,
        },
        Some(value) => Resolved::Found(TagValue::Field(value)),
    }
}

/// Format a number the way people write it on a label: integral values
/// without a fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for TagValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Field(value) => write_field(f, value),
            TagValue::Extra(value) => match value {
                DecodedValue::Text(s) => f.write_str(s),
                DecodedValue::Number(n) => f.write_str(&format_number(*n)),
                DecodedValue::Boolean(b) => write!(f, "{}", b),
                DecodedValue::ChoiceList(choices) => f.write_str(&choices.join(", ")),
                DecodedValue::Range(lo, hi) => {
                    write!(f, "{} – {}", format_number(*lo), format_number(*hi))
                }
            },
        }
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, value: &FieldValue) -> fmt::Result {
    match value {
        FieldValue::Null => Ok(()),
        FieldValue::Bool(b) => write!(f, "{}", b),
        FieldValue::Number(n) => f.write_str(&format_number(*n)),
        FieldValue::Text(s) => f.write_str(s),
        FieldValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_field(f, item)?;
            }
            Ok(())
        }
        // Only reachable inside lists; records on their own resolve to NotFound.
        FieldValue::Record(inner) => match inner.text_at("name") {
            Some(name) => f.write_str(name),
            None => Ok(()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spool() -> Record {
        Record::from_json(&json!({
            "id": 5,
            "remaining_weight": 812.0,
            "price": 24.99,
            "archived": false,
            "used_weight": 0,
            "lot_nr": null,
            "location": "",
            "filament": {
                "id": 2,
                "name": "Galaxy Black",
                "material": "PETG",
                "vendor": { "id": 9, "name": "Prusament", "extra": {} },
                "extra": { "nozzle": "\"0.6\"" }
            },
            "extra": {
                "dried": "true",
                "temp": "[230, 250]",
                "colors": "[\"black\", \"glitter\"]"
            }
        }))
    }

    fn text(path: &str, record: &Record) -> Option<String> {
        resolve(path, record).value().map(|v| v.to_string())
    }

    #[test]
    fn test_top_level_fields() {
        let r = spool();
        assert_eq!(text("id", &r), Some("5".into()));
        assert_eq!(text("remaining_weight", &r), Some("812".into()));
        assert_eq!(text("price", &r), Some("24.99".into()));
    }

    #[test]
    fn test_nested_path() {
        let r = spool();
        assert_eq!(text("filament.material", &r), Some("PETG".into()));
        assert_eq!(text("filament.vendor.name", &r), Some("Prusament".into()));
    }

    #[test]
    fn test_missing_segments_are_not_found() {
        let r = spool();
        assert_eq!(resolve("comment", &r), Resolved::NotFound);
        assert_eq!(resolve("filament.color_hex", &r), Resolved::NotFound);
        assert_eq!(resolve("storage.shelf.row", &r), Resolved::NotFound);
        assert_eq!(resolve("", &r), Resolved::NotFound);
    }

    #[test]
    fn test_path_ending_on_record_is_not_found() {
        let r = spool();
        assert_eq!(resolve("filament", &r), Resolved::NotFound);
        assert_eq!(resolve("filament.vendor", &r), Resolved::NotFound);
    }

    #[test]
    fn test_null_is_not_found_but_falsy_values_are_found() {
        let r = spool();
        assert_eq!(resolve("lot_nr", &r), Resolved::NotFound);
        assert_eq!(text("archived", &r), Some("false".into()));
        assert_eq!(text("used_weight", &r), Some("0".into()));
        assert_eq!(text("location", &r), Some("".into()));
    }

    #[test]
    fn test_extra_fields() {
        let r = spool();
        assert_eq!(text("extra.dried", &r), Some("true".into()));
        assert_eq!(text("extra.temp", &r), Some("230 – 250".into()));
        assert_eq!(text("extra.colors", &r), Some("black, glitter".into()));
        assert_eq!(resolve("extra.missing", &r), Resolved::NotFound);
        assert_eq!(resolve("extra", &r), Resolved::NotFound);
    }

    #[test]
    fn test_nested_extra() {
        let r = spool();
        assert_eq!(text("filament.extra.nozzle", &r), Some("0.6".into()));
    }

    #[test]
    fn test_segments_past_primitive_ignored() {
        let r = spool();
        assert_eq!(text("id.whatever", &r), Some("5".into()));
    }
}
