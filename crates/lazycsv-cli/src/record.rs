//! Schema-driven adapter used by the `import` command.
//!
//! Every field is kept as text unless it was named with `--integer`, in
//! which case it must parse as an `i64`.

use std::collections::BTreeSet;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use thiserror::Error;
use tracing::{debug, trace};

use lazycsv_ingest::RowAdapter;
use lazycsv_model::{Diagnostic, DiagnosticArg, RawRow};

use crate::logging::redact_value;

/// Diagnostic key for an `--integer` field that does not parse.
pub const INVALID_INTEGER: &str = "import_csv_invalid_integer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
        }
    }
}

/// One imported row: field names and typed values in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("field '{field}' is not an integer: '{value}'")]
    InvalidInteger { field: String, value: String },
}

#[derive(Debug, Clone, Default)]
pub struct RecordAdapter {
    integer_fields: BTreeSet<String>,
}

impl RecordAdapter {
    pub fn new<I, S>(integer_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            integer_fields: integer_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_integer(&self, field: &str) -> bool {
        self.integer_fields.contains(field)
    }

    fn typed(&self, field: &str, raw: &str) -> Result<Value, RecordError> {
        if !self.is_integer(field) {
            return Ok(Value::Text(raw.to_string()));
        }
        raw.trim()
            .parse()
            .map(Value::Integer)
            .map_err(|_| RecordError::InvalidInteger {
                field: field.to_string(),
                value: raw.to_string(),
            })
    }
}

impl RowAdapter for RecordAdapter {
    type Model = Record;
    type Error = RecordError;

    fn validate(&self, row: &RawRow, row_number: u64) -> Vec<Diagnostic> {
        row.iter()
            .filter(|(field, raw)| self.typed(field, raw).is_err())
            .map(|(field, raw)| {
                debug!(
                    row = row_number,
                    field,
                    value = redact_value(raw),
                    "integer field rejected"
                );
                Diagnostic::validation(
                    INVALID_INTEGER,
                    vec![
                        DiagnosticArg::Row(row_number),
                        DiagnosticArg::from(field),
                        DiagnosticArg::from(raw),
                    ],
                )
            })
            .collect()
    }

    fn convert(&self, row: &RawRow) -> Result<Record, RecordError> {
        let fields = row
            .iter()
            .map(|(field, raw)| -> Result<(String, Value), RecordError> {
                trace!(field, value = redact_value(raw), "converting field");
                Ok((field.to_string(), self.typed(field, raw)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Record { fields })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lazycsv_model::FieldSchema;

    use super::*;

    fn row(values: &[&str]) -> RawRow {
        let schema = Arc::new(FieldSchema::new(["name", "age", "city"]).unwrap());
        RawRow::bind(schema, values.iter().copied())
    }

    #[test]
    fn test_convert_types_integer_fields() {
        let adapter = RecordAdapter::new(["age"]);
        let record = adapter.convert(&row(&["alice", " 30 ", "Oslo"])).unwrap();
        assert_eq!(record.get("age"), Some(&Value::Integer(30)));
        assert_eq!(record.get("name"), Some(&Value::Text("alice".into())));
        let order: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(order, ["name", "age", "city"]);
    }

    #[test]
    fn test_validate_reports_each_bad_integer() {
        let adapter = RecordAdapter::new(["age", "city"]);
        let diagnostics = adapter.validate(&row(&["alice", "thirty", "Oslo"]), 4);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].key(), INVALID_INTEGER);
        assert_eq!(diagnostics[0].row(), Some(4));
        assert_eq!(
            diagnostics[0].args()[1..],
            [DiagnosticArg::from("age"), DiagnosticArg::from("thirty")]
        );
    }

    #[test]
    fn test_convert_rejects_bad_integer_directly() {
        let adapter = RecordAdapter::new(["age"]);
        let error = adapter.convert(&row(&["bob", "x", "Rome"])).unwrap_err();
        assert_eq!(
            error,
            RecordError::InvalidInteger {
                field: "age".into(),
                value: "x".into()
            }
        );
    }

    #[test]
    fn test_record_serializes_in_field_order() {
        let adapter = RecordAdapter::new(["age"]);
        let record = adapter.convert(&row(&["carol", "7", "Lima"])).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"carol","age":7,"city":"Lima"}"#);
    }
}
