//! Lazy parse/validate/convert pipeline.
//!
//! [`LazyCsvParser`] turns a CSV source into a [`RowStream`]: an iterator that
//! yields one [`RowOutcome`] per data row. Nothing is read until the first
//! pull. Structural problems and domain-rule violations end the stream after
//! a single failure; conversion faults are reported for their row and the
//! stream moves on.
//!
//! # Usage
//!
//! ```ignore
//! use lazycsv_ingest::LazyCsvParser;
//!
//! let parser = LazyCsvParser::new(adapter, ["name", "age"])?;
//! let batch: ImportBatch<_> = parser.parse_path("people.csv").collect();
//! ```

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{Span, debug, info, info_span, warn};

use lazycsv_model::{
    Diagnostic, DiagnosticArg, Diagnostics, FieldSchema, RawRow, RowOutcome, keys,
};

use crate::adapter::RowAdapter;
use crate::binder::{BoundRow, RowBinder};
use crate::dialect::{DEFAULT_SAMPLE_SIZE, sniff_dialect};
use crate::error::{IngestError, Result};

/// Options for one parse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Discard the first record before validation begins.
    /// Defaults to true.
    pub skip_header: bool,

    /// Characters sampled for dialect detection.
    /// Defaults to 1024.
    pub sample_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            skip_header: true,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl ParseOptions {
    /// Enable or disable header skipping.
    pub fn with_skip_header(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }

    /// Set the dialect sample size.
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }
}

/// Verdict of the per-row checks that run before conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowCheck {
    /// Row may be converted.
    Accept,
    /// Emit these diagnostics and end the stream.
    Halt(Diagnostics),
}

/// Parser bound to a schema and a row adapter.
///
/// The parser holds no per-parse state; every `parse_*` call returns an
/// independent stream that owns its own source.
pub struct LazyCsvParser<A> {
    adapter: A,
    schema: Arc<FieldSchema>,
}

impl<A: RowAdapter> LazyCsvParser<A> {
    /// Fails when `fields` is empty, blank, or repeats a name.
    pub fn new<I, S>(adapter: A, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = FieldSchema::new(fields)?;
        Ok(Self::with_schema(adapter, schema))
    }

    pub fn with_schema(adapter: A, schema: FieldSchema) -> Self {
        Self {
            adapter,
            schema: Arc::new(schema),
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Parse base64-encoded UTF-8 CSV text, skipping the header row.
    pub fn parse_base64(&self, content: impl Into<String>) -> RowStream<'_, A, Cursor<Vec<u8>>> {
        self.parse_base64_with_options(content, &ParseOptions::default())
    }

    /// Parse base64-encoded UTF-8 CSV text.
    ///
    /// ASCII whitespace in `content` (line wrapping) is ignored. Decoding
    /// faults surface as the stream's only item.
    pub fn parse_base64_with_options(
        &self,
        content: impl Into<String>,
        options: &ParseOptions,
    ) -> RowStream<'_, A, Cursor<Vec<u8>>> {
        let content = content.into();
        RowStream::new(
            self,
            *options,
            info_span!("csv_import", source = "base64"),
            Box::new(move || decode_base64(&content)),
        )
    }

    /// Parse a CSV file, skipping the header row.
    pub fn parse_path(&self, path: impl AsRef<Path>) -> RowStream<'_, A, File> {
        self.parse_path_with_options(path, &ParseOptions::default())
    }

    /// Parse a CSV file. The file is opened on the first pull.
    pub fn parse_path_with_options(
        &self,
        path: impl AsRef<Path>,
        options: &ParseOptions,
    ) -> RowStream<'_, A, File> {
        let path = path.as_ref().to_path_buf();
        let span = info_span!("csv_import", source = %path.display());
        RowStream::new(self, *options, span, Box::new(move || open_file(path)))
    }

    /// Parse an already-open source, skipping the header row.
    pub fn parse_source<'a, R>(&'a self, source: R) -> RowStream<'a, A, R>
    where
        R: Read + Seek + 'a,
    {
        self.parse_source_with_options(source, &ParseOptions::default())
    }

    /// Parse an already-open source. The stream takes ownership of `source`
    /// and drops it when the stream ends or is dropped.
    pub fn parse_source_with_options<'a, R>(
        &'a self,
        source: R,
        options: &ParseOptions,
    ) -> RowStream<'a, A, R>
    where
        R: Read + Seek + 'a,
    {
        RowStream::new(
            self,
            *options,
            info_span!("csv_import", source = "reader"),
            Box::new(move || Ok(source)),
        )
    }

    /// Structural checks followed by the adapter's domain validation.
    ///
    /// Checks run in order and the first failing one decides: extra columns,
    /// then empty fields, then adapter diagnostics.
    pub fn check_row(&self, row: &RawRow, row_number: u64) -> RowCheck {
        if row.field_count() > self.schema.len() {
            return RowCheck::Halt(Diagnostics::single(Diagnostic::validation(
                keys::TOO_MANY_FIELDS,
                vec![
                    DiagnosticArg::Row(row_number),
                    DiagnosticArg::fields(self.schema.iter().cloned()),
                ],
            )));
        }

        let missing = row.empty_fields();
        if !missing.is_empty() {
            return RowCheck::Halt(Diagnostics::single(Diagnostic::validation(
                keys::MISSING_FIELDS,
                vec![
                    DiagnosticArg::Row(row_number),
                    DiagnosticArg::fields(self.schema.iter().cloned()),
                    DiagnosticArg::Fields(missing),
                ],
            )));
        }

        match Diagnostics::new(self.adapter.validate(row, row_number)) {
            Some(violations) => RowCheck::Halt(violations),
            None => RowCheck::Accept,
        }
    }
}

fn decode_base64(content: &str) -> Result<Cursor<Vec<u8>>> {
    let compact: Vec<u8> = content
        .bytes()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
    std::str::from_utf8(&bytes).map_err(IngestError::InvalidUtf8)?;
    Ok(Cursor::new(bytes))
}

fn open_file(path: PathBuf) -> Result<File> {
    File::open(&path).map_err(|source| IngestError::FileOpen { path, source })
}

type Opener<'a, R> = Box<dyn FnOnce() -> Result<R> + 'a>;

enum StreamState<'a, R> {
    /// Source not acquired yet.
    Pending(Opener<'a, R>),
    /// Dialect detected, header handled, reading data rows.
    Rows(RowBinder<R>),
    /// Exhausted or halted. The source has been dropped.
    Done,
}

enum Step<M> {
    Continue(RowOutcome<M>),
    Halt(RowOutcome<M>),
}

/// Lazy sequence of row outcomes for one parse call.
///
/// Ends after input is exhausted or after the first fatal failure. Dropping
/// the stream early releases the source.
pub struct RowStream<'a, A, R> {
    parser: &'a LazyCsvParser<A>,
    options: ParseOptions,
    state: StreamState<'a, R>,
    span: Span,
    succeeded: usize,
    failed: usize,
}

impl<'a, A, R> RowStream<'a, A, R>
where
    A: RowAdapter,
    R: Read + Seek,
{
    fn new(
        parser: &'a LazyCsvParser<A>,
        options: ParseOptions,
        span: Span,
        opener: Opener<'a, R>,
    ) -> Self {
        Self {
            parser,
            options,
            state: StreamState::Pending(opener),
            span,
            succeeded: 0,
            failed: 0,
        }
    }

    /// True once the stream has ended; further pulls yield `None`.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, StreamState::Done)
    }

    fn start(&self, opener: Opener<'a, R>) -> Result<RowBinder<R>> {
        let mut source = opener()?;
        let dialect = sniff_dialect(&mut source, self.options.sample_size)?;
        debug!(
            delimiter = %dialect.delimiter_label(),
            quote = %char::from(dialect.quote),
            "detected csv dialect"
        );
        let mut binder = RowBinder::new(source, &dialect, Arc::clone(&self.parser.schema));
        if self.options.skip_header && binder.skip_row()? {
            debug!("skipped header row");
        }
        Ok(binder)
    }

    fn process(&self, bound: BoundRow) -> Step<A::Model> {
        let BoundRow { line, row } = bound;
        match self.parser.check_row(&row, line) {
            RowCheck::Halt(diagnostics) => {
                warn!(
                    row = line,
                    key = diagnostics.first().key(),
                    count = diagnostics.len(),
                    "row rejected, halting import"
                );
                Step::Halt(RowOutcome::Failure(diagnostics))
            }
            RowCheck::Accept => match self.parser.adapter.convert(&row) {
                Ok(model) => Step::Continue(RowOutcome::Success(model)),
                Err(error) => {
                    warn!(row = line, error = %error, "row conversion failed");
                    Step::Continue(RowOutcome::failure(Diagnostic::error(
                        keys::CONVERSION_ERROR,
                        vec![DiagnosticArg::Row(line), DiagnosticArg::fault(&error)],
                    )))
                }
            },
        }
    }

    fn record(&mut self, outcome: RowOutcome<A::Model>) -> Option<RowOutcome<A::Model>> {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        Some(outcome)
    }

    fn abort(&mut self, error: &IngestError) -> Option<RowOutcome<A::Model>> {
        warn!(error = %error, "csv import aborted");
        let outcome = self.record(RowOutcome::failure(Diagnostic::generic(error)));
        self.finish();
        outcome
    }

    fn finish(&mut self) {
        self.state = StreamState::Done;
        info!(
            succeeded = self.succeeded,
            failed = self.failed,
            "csv import finished"
        );
    }
}

impl<A, R> Iterator for RowStream<'_, A, R>
where
    A: RowAdapter,
    R: Read + Seek,
{
    type Item = RowOutcome<A::Model>;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.span.clone();
        let _guard = span.enter();
        loop {
            match std::mem::replace(&mut self.state, StreamState::Done) {
                StreamState::Pending(opener) => match self.start(opener) {
                    Ok(binder) => self.state = StreamState::Rows(binder),
                    Err(error) => return self.abort(&error),
                },
                StreamState::Rows(mut binder) => {
                    return match binder.next_row() {
                        Ok(Some(bound)) => match self.process(bound) {
                            Step::Continue(outcome) => {
                                self.state = StreamState::Rows(binder);
                                self.record(outcome)
                            }
                            Step::Halt(outcome) => {
                                drop(binder);
                                let outcome = self.record(outcome);
                                self.finish();
                                outcome
                            }
                        },
                        Ok(None) => {
                            drop(binder);
                            self.finish();
                            None
                        }
                        Err(error) => {
                            drop(binder);
                            self.abort(&error)
                        }
                    };
                }
                StreamState::Done => return None,
            }
        }
    }
}

impl<A, R> std::iter::FusedIterator for RowStream<'_, A, R>
where
    A: RowAdapter,
    R: Read + Seek,
{
}
