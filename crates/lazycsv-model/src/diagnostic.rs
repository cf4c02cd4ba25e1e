use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Error,
    Validation,
    Warning,
    Info,
}

impl DiagnosticCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Validation => "validation",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Info => "info",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supporting value attached to a [`Diagnostic`].
///
/// Arguments are opaque to the pipeline; they exist so a renderer can fill in
/// message templates looked up by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticArg {
    /// 1-based physical row number.
    Row(u64),
    Text(String),
    /// Ordered list of field names.
    Fields(Vec<String>),
    /// Display form of a captured fault.
    Fault(String),
}

impl DiagnosticArg {
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DiagnosticArg::Fields(names.into_iter().map(Into::into).collect())
    }

    pub fn fault(error: &dyn std::error::Error) -> Self {
        DiagnosticArg::Fault(error.to_string())
    }
}

impl fmt::Display for DiagnosticArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticArg::Row(row) => write!(f, "{row}"),
            DiagnosticArg::Text(text) | DiagnosticArg::Fault(text) => f.write_str(text),
            DiagnosticArg::Fields(names) => write!(f, "[{}]", names.join(", ")),
        }
    }
}

impl From<u64> for DiagnosticArg {
    fn from(value: u64) -> Self {
        DiagnosticArg::Row(value)
    }
}

impl From<&str> for DiagnosticArg {
    fn from(value: &str) -> Self {
        DiagnosticArg::Text(value.to_string())
    }
}

impl From<String> for DiagnosticArg {
    fn from(value: String) -> Self {
        DiagnosticArg::Text(value)
    }
}

/// One problem found while importing: category, identifying key and the
/// arguments a renderer needs to describe it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    category: DiagnosticCategory,
    key: String,
    args: Vec<DiagnosticArg>,
}

impl Diagnostic {
    pub fn new(
        category: DiagnosticCategory,
        key: impl Into<String>,
        args: Vec<DiagnosticArg>,
    ) -> Self {
        Self {
            category,
            key: key.into(),
            args,
        }
    }

    pub fn validation(key: impl Into<String>, args: Vec<DiagnosticArg>) -> Self {
        Self::new(DiagnosticCategory::Validation, key, args)
    }

    pub fn error(key: impl Into<String>, args: Vec<DiagnosticArg>) -> Self {
        Self::new(DiagnosticCategory::Error, key, args)
    }

    /// Catch-all diagnostic for a fault that escaped row-level handling.
    pub fn generic(error: &dyn std::error::Error) -> Self {
        Self::error(keys::GENERIC_IMPORT_ERROR, vec![DiagnosticArg::fault(error)])
    }

    pub fn category(&self) -> DiagnosticCategory {
        self.category
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn args(&self) -> &[DiagnosticArg] {
        &self.args
    }

    /// Row number carried as the first argument, if any.
    pub fn row(&self) -> Option<u64> {
        match self.args.first() {
            Some(DiagnosticArg::Row(row)) => Some(*row),
            _ => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category, self.key)?;
        if !self.args.is_empty() {
            let rendered: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            write!(f, " ({})", rendered.join("; "))?;
        }
        Ok(())
    }
}

/// Non-empty, ordered list of diagnostics carried by a failed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Diagnostic>", into = "Vec<Diagnostic>")]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Returns `None` when `items` is empty.
    pub fn new(items: Vec<Diagnostic>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    pub fn single(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }

    pub fn first(&self) -> &Diagnostic {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept so `len` has its usual companion.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl TryFrom<Vec<Diagnostic>> for Diagnostics {
    type Error = &'static str;

    fn try_from(items: Vec<Diagnostic>) -> Result<Self, Self::Error> {
        Self::new(items).ok_or("diagnostics must not be empty")
    }
}

impl From<Diagnostics> for Vec<Diagnostic> {
    fn from(diagnostics: Diagnostics) -> Self {
        diagnostics.0
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::single(diagnostic)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
