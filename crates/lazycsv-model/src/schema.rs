use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{ModelError, Result};

/// Ordered, non-empty list of field names that CSV columns are bound to by
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldSchema(Vec<String>);

impl FieldSchema {
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(ModelError::EmptySchema);
        }
        let mut seen = BTreeSet::new();
        for (position, name) in fields.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ModelError::BlankField { position });
            }
            if !seen.insert(name.as_str()) {
                return Err(ModelError::DuplicateField(name.clone()));
            }
        }
        Ok(Self(fields))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: construction rejects empty schemas.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|field| field == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// One CSV row bound to a [`FieldSchema`].
///
/// Columns missing from a short row are bound as empty strings. Columns past
/// the end of the schema are kept in [`RawRow::extra`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    schema: Arc<FieldSchema>,
    values: Vec<String>,
    extra: Vec<String>,
}

impl RawRow {
    pub fn bind<I, S>(schema: Arc<FieldSchema>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = Vec::with_capacity(schema.len());
        let mut extra = Vec::new();
        for column in columns {
            if values.len() < schema.len() {
                values.push(column.into());
            } else {
                extra.push(column.into());
            }
        }
        values.resize(schema.len(), String::new());
        Self {
            schema,
            values,
            extra,
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        let idx = self.schema.position(field)?;
        self.values.get(idx).map(String::as_str)
    }

    /// `(field, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schema
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Columns beyond the schema, in file order.
    pub fn extra(&self) -> &[String] {
        &self.extra
    }

    /// Number of bound fields plus unmapped extra columns.
    pub fn field_count(&self) -> usize {
        self.values.len() + self.extra.len()
    }

    /// Names of fields whose value is empty, in schema order.
    pub fn empty_fields(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field.to_string())
            .collect()
    }
}
