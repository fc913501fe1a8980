//! Entity records
//!
//! The REST API hands out spools, filaments and vendors as nested JSON
//! objects. Ad-hoc user fields live in an `extra` object whose values are
//! JSON-encoded strings; those are decoded once here, at the boundary, so the
//! template engine never parses strings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of entity a label is printed for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Spool,
    Filament,
    Vendor,
}

impl EntityKind {
    /// REST path segment (`/api/v1/{segment}/{id}`)
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Spool => "spool",
            Self::Filament => "filament",
            Self::Vendor => "vendor",
        }
    }

    /// Single-letter prefix used in short entity links (`web+spoolman:s-12`)
    pub fn link_prefix(&self) -> char {
        match self {
            Self::Spool => 's',
            Self::Filament => 'f',
            Self::Vendor => 'v',
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spool" => Ok(Self::Spool),
            "filament" => Ok(Self::Filament),
            "vendor" => Ok(Self::Vendor),
            other => Err(format!("unknown entity kind: {}", other)),
        }
    }
}

/// A value of a regular entity field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
    Record(Box<Record>),
}

impl FieldValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(_) => Self::Record(Box::new(Record::from_json(value))),
        }
    }
}

/// A decoded `extra` field value
///
/// The REST API stores extra fields as JSON text; the shape of the decoded
/// JSON decides the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DecodedValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    ChoiceList(Vec<String>),
    Range(f64, f64),
}

impl DecodedValue {
    /// Decode one stored extra string
    ///
    /// Text that is not valid JSON, or JSON of a shape no extra field type
    /// produces, is kept verbatim as [`DecodedValue::Text`].
    pub fn decode(raw: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Self::Text(raw.to_string());
        };

        match value {
            Value::String(s) => Self::Text(s),
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            Value::Array(items) => {
                if let [Value::Number(lo), Value::Number(hi)] = items.as_slice() {
                    return Self::Range(
                        lo.as_f64().unwrap_or_default(),
                        hi.as_f64().unwrap_or_default(),
                    );
                }
                let choices: Option<Vec<String>> = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect();
                match choices {
                    Some(choices) => Self::ChoiceList(choices),
                    None => Self::Text(raw.to_string()),
                }
            }
            Value::Null | Value::Object(_) => Self::Text(raw.to_string()),
        }
    }
}

/// An entity record: regular fields plus decoded `extra` fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub extra: BTreeMap<String, DecodedValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from the JSON object returned by the REST API
    ///
    /// Non-object input yields an empty record. Nested objects become nested
    /// records with their own `extra` maps.
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        let mut record = Self::default();
        for (key, value) in map {
            if key == "extra" {
                if let Value::Object(extra) = value {
                    for (name, raw) in extra {
                        let decoded = match raw {
                            Value::String(s) => DecodedValue::decode(s),
                            other => DecodedValue::decode(&other.to_string()),
                        };
                        record.extra.insert(name.clone(), decoded);
                    }
                }
                continue;
            }
            record
                .fields
                .insert(key.clone(), FieldValue::from_json(value));
        }
        record
    }

    /// Regular field lookup
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Numeric `id` field, if present
    pub fn id(&self) -> Option<i64> {
        match self.fields.get("id") {
            Some(FieldValue::Number(n)) => Some(*n as i64),
            Some(FieldValue::Text(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// Text of a (possibly nested) field, following dotted keys
    pub fn text_at(&self, path: &str) -> Option<&str> {
        let mut current = self;
        let mut parts = path.split('.').peekable();
        while let Some(part) = parts.next() {
            match current.fields.get(part)? {
                FieldValue::Record(inner) if parts.peek().is_some() => current = inner,
                FieldValue::Text(s) if parts.peek().is_none() => return Some(s.as_str()),
                _ => return None,
            }
        }
        None
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: DecodedValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Record> for FieldValue {
    fn from(r: Record) -> Self {
        Self::Record(Box::new(r))
    }
}
