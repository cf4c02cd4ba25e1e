//! Per-row result of an import.

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, Diagnostics};

/// Result of importing one row: either the diagnostics explaining why it
/// failed or the model it produced. Never both, never neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcome<M> {
    Failure(Diagnostics),
    Success(M),
}

impl<M> RowOutcome<M> {
    pub fn failure(diagnostic: Diagnostic) -> Self {
        RowOutcome::Failure(Diagnostics::single(diagnostic))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RowOutcome::Failure(_))
    }

    pub fn success(&self) -> Option<&M> {
        match self {
            RowOutcome::Success(model) => Some(model),
            RowOutcome::Failure(_) => None,
        }
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            RowOutcome::Failure(diagnostics) => Some(diagnostics),
            RowOutcome::Success(_) => None,
        }
    }

    pub fn map<T, F>(self, f: F) -> RowOutcome<T>
    where
        F: FnOnce(M) -> T,
    {
        match self {
            RowOutcome::Failure(diagnostics) => RowOutcome::Failure(diagnostics),
            RowOutcome::Success(model) => RowOutcome::Success(f(model)),
        }
    }

    pub fn into_result(self) -> Result<M, Diagnostics> {
        match self {
            RowOutcome::Failure(diagnostics) => Err(diagnostics),
            RowOutcome::Success(model) => Ok(model),
        }
    }
}

impl<M> From<Result<M, Diagnostics>> for RowOutcome<M> {
    fn from(result: Result<M, Diagnostics>) -> Self {
        match result {
            Ok(model) => RowOutcome::Success(model),
            Err(diagnostics) => RowOutcome::Failure(diagnostics),
        }
    }
}

/// Outcomes split into imported models and reported diagnostics, both in
/// emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatch<M> {
    pub models: Vec<M>,
    pub failures: Vec<Diagnostics>,
}

impl<M> Default for ImportBatch<M> {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<M> ImportBatch<M> {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// All diagnostics across failed rows, flattened.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.failures.iter().flat_map(Diagnostics::iter)
    }
}

impl<M> FromIterator<RowOutcome<M>> for ImportBatch<M> {
    fn from_iter<I: IntoIterator<Item = RowOutcome<M>>>(iter: I) -> Self {
        let mut batch = ImportBatch::default();
        for outcome in iter {
            match outcome {
                RowOutcome::Success(model) => batch.models.push(model),
                RowOutcome::Failure(diagnostics) => batch.failures.push(diagnostics),
            }
        }
        batch
    }
}

/// Drain `outcomes` into an [`ImportBatch`].
pub fn partition_outcomes<M, I>(outcomes: I) -> ImportBatch<M>
where
    I: IntoIterator<Item = RowOutcome<M>>,
{
    outcomes.into_iter().collect()
}
