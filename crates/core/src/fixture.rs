//! Fixture records: parsing, serialization and value coercion.
//!
//! A fixture is a JSON array of records shaped like
//!
//! ```json
//! [{"model": "pages.page", "pk": 1, "fields": {"title": "Home", "path": "/"}}]
//! ```

use std::io::Read;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::FieldKind;

/// One serialized database row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub model: String,
    /// `null` (or absent) lets the database assign a key.
    #[serde(default)]
    pub pk: Value,
    #[serde(default)]
    pub fields: IndexMap<String, Value>,
}

impl FixtureRecord {
    /// Primary key rendered the way error messages show it.
    pub fn pk_display(&self) -> String {
        match &self.pk {
            Value::Null => "None".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Failures while decoding or applying a fixture.
///
/// The `Display` text is what administrators see after
/// `An exception occurred while loading data: `.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("No JSON object could be decoded")]
    Malformed,

    #[error("Fixture must be a JSON array of records")]
    NotASequence,

    #[error("Invalid fixture record at index {index}: {detail}")]
    InvalidRecord { index: usize, detail: String },

    #[error("Invalid model identifier: '{0}'")]
    UnknownModel(String),

    #[error("{model} has no field named '{field}'")]
    UnknownField { model: String, field: String },

    #[error("Could not load {model}(pk={pk}): {detail}")]
    Record {
        model: String,
        pk: String,
        detail: String,
    },

    #[error("{0}")]
    Database(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl FixtureError {
    fn from_json(err: serde_json::Error) -> Self {
        if err.is_io() {
            return Self::Io(err.into());
        }
        // Syntax errors and premature EOF (including empty input) both mean
        // there was no JSON document to speak of.
        Self::Malformed
    }
}

/// Parse a fixture held in memory.
pub fn parse_slice(bytes: &[u8]) -> Result<Vec<FixtureRecord>, FixtureError> {
    let value: Value = serde_json::from_slice(bytes).map_err(FixtureError::from_json)?;
    records_from_value(value)
}

/// Parse a fixture from a reader without loading the raw text first.
///
/// Callers should hand in a buffered reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Vec<FixtureRecord>, FixtureError> {
    let value: Value = serde_json::from_reader(reader).map_err(FixtureError::from_json)?;
    records_from_value(value)
}

fn records_from_value(value: Value) -> Result<Vec<FixtureRecord>, FixtureError> {
    let Value::Array(items) = value else {
        return Err(FixtureError::NotASequence);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<FixtureRecord>(item).map_err(|e| {
                FixtureError::InvalidRecord {
                    index,
                    detail: e.to_string(),
                }
            })
        })
        .collect()
}

/// Serialize records as a fixture document.
///
/// `indent` is the number of spaces per nesting level; `None` produces
/// compact output.
pub fn to_bytes(records: &[FixtureRecord], indent: Option<usize>) -> Result<Vec<u8>, serde_json::Error> {
    match indent {
        None => serde_json::to_vec(records),
        Some(width) => {
            let indent = " ".repeat(width);
            let mut out = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
            records.serialize(&mut ser)?;
            Ok(out)
        }
    }
}

/// A fixture value coerced to a column's storage type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl FieldValue {
    /// Coerce a JSON value for a column of the given kind.
    ///
    /// The error is a short human-readable reason.
    pub fn coerce(kind: FieldKind, value: &Value) -> Result<Self, String> {
        if value.is_null() {
            return Ok(Self::Null);
        }

        match kind {
            FieldKind::Integer => match value {
                Value::Number(n) => n
                    .as_i64()
                    .map(Self::Integer)
                    .ok_or_else(|| format!("'{n}' value must be an integer")),
                Value::String(s) => s
                    .trim()
                    .parse()
                    .map(Self::Integer)
                    .map_err(|_| format!("'{s}' value must be an integer")),
                other => Err(format!("'{other}' value must be an integer")),
            },
            FieldKind::Float => match value {
                Value::Number(n) => n
                    .as_f64()
                    .map(Self::Float)
                    .ok_or_else(|| format!("'{n}' value must be a float")),
                Value::String(s) => s
                    .trim()
                    .parse()
                    .map(Self::Float)
                    .map_err(|_| format!("'{s}' value must be a float")),
                other => Err(format!("'{other}' value must be a float")),
            },
            FieldKind::Boolean => match value {
                Value::Bool(b) => Ok(Self::Boolean(*b)),
                Value::Number(n) if n.as_i64() == Some(0) => Ok(Self::Boolean(false)),
                Value::Number(n) if n.as_i64() == Some(1) => Ok(Self::Boolean(true)),
                other => Err(format!("'{other}' value must be either true or false")),
            },
            FieldKind::Text => match value {
                Value::String(s) => Ok(Self::Text(s.clone())),
                Value::Number(n) => Ok(Self::Text(n.to_string())),
                Value::Bool(b) => Ok(Self::Text(b.to_string())),
                other => Err(format!("'{other}' value must be a string")),
            },
            FieldKind::DateTime => match value {
                Value::String(s) if is_datetime(s) => Ok(Self::Text(s.clone())),
                other => Err(format!(
                    "'{other}' value has an invalid format, it must be in YYYY-MM-DDTHH:MM[:ss[.uuuuuu]][TZ] format"
                )),
            },
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Integer(i) => Value::from(i),
            Self::Float(f) => Value::from(f),
            Self::Boolean(b) => Value::Bool(b),
            Self::Text(s) => Value::String(s),
        }
    }
}

fn is_datetime(s: &str) -> bool {
    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || NAIVE_FORMATS
            .iter()
            .any(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).is_ok())
}
