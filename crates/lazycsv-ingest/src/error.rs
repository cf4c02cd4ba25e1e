//! Error types for CSV import.

use std::path::PathBuf;
use thiserror::Error;

use lazycsv_model::ModelError;

/// Faults raised while acquiring or reading a CSV source.
///
/// The pipeline never hands these to the consumer directly; each one is
/// lifted into a generic diagnostic that ends the row stream.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Construction Errors ===
    /// Schema rejected when building the parser.
    #[error("invalid schema: {0}")]
    Schema(#[from] ModelError),

    // === Source Acquisition Errors ===
    /// Encoded content is not valid base64.
    #[error("failed to decode base64 content: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Source bytes are not valid UTF-8.
    #[error("content is not valid UTF-8: {0}")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    /// Failed to open a CSV file.
    #[error("failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Stream Errors ===
    /// Failed to read from the source.
    #[error("failed to read source: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to rewind the source after sampling.
    #[error("failed to rewind source: {0}")]
    Seek(#[source] std::io::Error),

    /// Malformed record or read failure inside the CSV reader.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    // === Dialect Errors ===
    /// No delimiter or quoting convention could be inferred from the sample.
    #[error("could not determine CSV dialect: {reason}")]
    DialectUndetermined { reason: String },
}

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, IngestError>;
