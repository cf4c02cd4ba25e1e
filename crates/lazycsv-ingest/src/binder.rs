//! Positional binding of CSV records to a field schema.

use std::io::{self, Read};
use std::sync::Arc;

use csv::StringRecord;

use lazycsv_model::{FieldSchema, RawRow};

use crate::dialect::Dialect;
use crate::error::Result;

/// A bound row and the 1-based physical line its first field starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundRow {
    pub line: u64,
    pub row: RawRow,
}

/// Source wrapper that remembers the bytes handed to the csv reader until the
/// binder has located the record starting in them.
///
/// The reader's own record positions are taken before leading terminators
/// are consumed, which puts CRLF rows and rows after blank lines on an
/// earlier line.
struct LineTracker<R> {
    inner: R,
    pending: Vec<u8>,
    /// Byte offset of `pending[0]`.
    base: u64,
    /// Line number at `base`.
    line: u64,
}

impl<R> LineTracker<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            base: 0,
            line: 1,
        }
    }

    /// Line of the first content byte at or after `offset`, skipping `\r`
    /// and `\n`. Bytes before `offset` are released.
    fn content_line(&mut self, offset: u64) -> u64 {
        let consumed = usize::try_from(offset.saturating_sub(self.base))
            .unwrap_or(usize::MAX)
            .min(self.pending.len());
        self.line += newlines(&self.pending[..consumed]);
        self.pending.drain(..consumed);
        self.base += consumed as u64;

        let mut line = self.line;
        for &byte in &self.pending {
            match byte {
                b'\n' => line += 1,
                b'\r' => {}
                _ => break,
            }
        }
        line
    }
}

impl<R: Read> Read for LineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.pending.extend_from_slice(&buf[..read]);
        Ok(read)
    }
}

fn newlines(bytes: &[u8]) -> u64 {
    bytes.iter().filter(|&&byte| byte == b'\n').count() as u64
}

/// Reads records in file order and binds them to the schema by position.
///
/// Header names in the file play no part in binding. Blank lines are skipped
/// by the underlying reader.
pub struct RowBinder<R> {
    reader: csv::Reader<LineTracker<R>>,
    schema: Arc<FieldSchema>,
    record: StringRecord,
    skip_initial_space: bool,
}

impl<R: Read> RowBinder<R> {
    /// `source` must be positioned at its first byte.
    pub fn new(source: R, dialect: &Dialect, schema: Arc<FieldSchema>) -> Self {
        Self {
            reader: dialect.reader_builder().from_reader(LineTracker::new(source)),
            schema,
            record: StringRecord::new(),
            skip_initial_space: dialect.skip_initial_space,
        }
    }

    /// Reads and binds the next record; `None` at end of input.
    pub fn next_row(&mut self) -> Result<Option<BoundRow>> {
        let Some(line) = self.read_record()? else {
            return Ok(None);
        };
        let skip_initial_space = self.skip_initial_space;
        let columns = self.record.iter().map(|field| {
            if skip_initial_space {
                field.trim_start_matches(' ')
            } else {
                field
            }
        });
        let row = RawRow::bind(Arc::clone(&self.schema), columns);
        Ok(Some(BoundRow { line, row }))
    }

    /// Discards one record without binding it. Returns false at end of input.
    pub fn skip_row(&mut self) -> Result<bool> {
        Ok(self.read_record()?.is_some())
    }

    /// Reads into `self.record` and returns the record's start line.
    fn read_record(&mut self) -> Result<Option<u64>> {
        let offset = self.reader.position().byte();
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        let offset = self.record.position().map_or(offset, csv::Position::byte);
        Ok(Some(self.reader.get_mut().content_line(offset)))
    }
}
