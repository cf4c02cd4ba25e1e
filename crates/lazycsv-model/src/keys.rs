//! Diagnostic keys emitted by the import pipeline.
//!
//! Keys are stable identifiers; rendering them into user-facing text is left
//! to whoever consumes the diagnostics.

/// Unclassified fault while acquiring or reading the source.
pub const GENERIC_IMPORT_ERROR: &str = "import_csv_generic_error";

/// A row carries more columns than the schema declares.
pub const TOO_MANY_FIELDS: &str = "import_csv_enough_fields";

/// A row has one or more empty fields.
pub const MISSING_FIELDS: &str = "import_csv_missing_fields";

/// The row adapter failed to convert an otherwise valid row.
pub const CONVERSION_ERROR: &str = "import_csv_conversion_error";
