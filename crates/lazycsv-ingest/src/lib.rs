//! Lazy CSV import.
//!
//! This crate streams rows out of a CSV source, checks them against a fixed
//! schema, and hands valid rows to a [`RowAdapter`] for domain validation and
//! conversion. Every row produces a [`RowOutcome`](lazycsv_model::RowOutcome)
//! so a caller can import what is valid and report what is not.
//!
//! # Features
//!
//! - **Dialect Detection**: delimiter and quoting inferred from a 1024-character sample
//! - **Positional Binding**: columns bound to schema fields by position, headers ignored
//! - **Fail-Fast Structure**: extra columns, empty fields, or adapter violations end the stream
//! - **Row-Local Conversion Faults**: a failed conversion is reported and the stream continues
//!
//! # Example
//!
//! ```ignore
//! use lazycsv_ingest::{LazyCsvParser, ParseOptions};
//! use lazycsv_model::partition_outcomes;
//!
//! let parser = LazyCsvParser::new(PersonAdapter, ["name", "age"])?;
//! let batch = partition_outcomes(parser.parse_base64(encoded));
//! for failure in &batch.failures {
//!     report(failure);
//! }
//! ```

mod adapter;
mod binder;
mod dialect;
mod error;
mod pipeline;

// === Error Types ===
pub use error::{IngestError, Result};

// === Row Adapter Contract ===
pub use adapter::RowAdapter;

// === Dialect Detection ===
pub use dialect::{
    DEFAULT_SAMPLE_SIZE, Dialect, Sample, detect_dialect, read_sample, sniff_dialect,
};

// === Row Binding ===
pub use binder::{BoundRow, RowBinder};

// === Pipeline ===
pub use pipeline::{LazyCsvParser, ParseOptions, RowCheck, RowStream};
