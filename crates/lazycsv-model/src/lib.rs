//! Value types shared by the lazy CSV import pipeline.

pub mod diagnostic;
pub mod error;
pub mod keys;
pub mod outcome;
pub mod schema;

pub use diagnostic::{Diagnostic, DiagnosticArg, DiagnosticCategory, Diagnostics};
pub use error::{ModelError, Result};
pub use outcome::{ImportBatch, RowOutcome, partition_outcomes};
pub use schema::{FieldSchema, RawRow};
