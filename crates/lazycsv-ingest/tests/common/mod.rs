//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::rc::Rc;

use base64::Engine as _;
use thiserror::Error;

use lazycsv_ingest::RowAdapter;
use lazycsv_model::{Diagnostic, DiagnosticArg, RawRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

#[derive(Debug, Error)]
#[error("age '{0}' is not a number")]
pub struct BadAge(pub String);

/// Converts `name,age` rows; conversion fails when `age` is not numeric.
#[derive(Default)]
pub struct PersonAdapter {
    violations: BTreeMap<String, Vec<Diagnostic>>,
    pub validated: RefCell<Vec<u64>>,
    pub converted: Cell<usize>,
}

impl PersonAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `validate` report `diagnostics` for rows named `name`.
    pub fn with_violations(mut self, name: &str, diagnostics: Vec<Diagnostic>) -> Self {
        self.violations.insert(name.to_string(), diagnostics);
        self
    }
}

impl RowAdapter for PersonAdapter {
    type Model = Person;
    type Error = BadAge;

    fn validate(&self, row: &RawRow, row_number: u64) -> Vec<Diagnostic> {
        self.validated.borrow_mut().push(row_number);
        row.get("name")
            .and_then(|name| self.violations.get(name))
            .cloned()
            .unwrap_or_default()
    }

    fn convert(&self, row: &RawRow) -> Result<Person, BadAge> {
        self.converted.set(self.converted.get() + 1);
        let name = row.get("name").unwrap_or_default().to_string();
        let age = row.get("age").unwrap_or_default();
        let age = age.parse().map_err(|_| BadAge(age.to_string()))?;
        Ok(Person { name, age })
    }
}

pub fn person(name: &str, age: u32) -> Person {
    Person {
        name: name.to_string(),
        age,
    }
}

pub fn rule(key: &str, row: u64) -> Diagnostic {
    Diagnostic::validation(key, vec![DiagnosticArg::Row(row)])
}

pub fn encode(text: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(text)
}

/// In-memory source that records reads and when it is dropped.
pub struct TrackedSource {
    inner: Cursor<Vec<u8>>,
    pub reads: Rc<Cell<usize>>,
    pub dropped: Rc<Cell<bool>>,
}

impl TrackedSource {
    pub fn new(text: &str) -> Self {
        Self {
            inner: Cursor::new(text.as_bytes().to_vec()),
            reads: Rc::new(Cell::new(0)),
            dropped: Rc::new(Cell::new(false)),
        }
    }
}

impl Read for TrackedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.set(self.reads.get() + 1);
        self.inner.read(buf)
    }
}

impl Seek for TrackedSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Drop for TrackedSource {
    fn drop(&mut self) {
        self.dropped.set(true);
    }
}

/// Source whose reads fail once `fail_after` bytes have been served.
pub struct FailingSource {
    inner: Cursor<Vec<u8>>,
    fail_after: u64,
}

impl FailingSource {
    pub fn new(text: &str, fail_after: u64) -> Self {
        Self {
            inner: Cursor::new(text.as_bytes().to_vec()),
            fail_after,
        }
    }
}

impl Read for FailingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.inner.position() >= self.fail_after {
            return Err(io::Error::other("device unplugged"));
        }
        let room = (self.fail_after - self.inner.position()) as usize;
        let len = buf.len().min(room);
        self.inner.read(&mut buf[..len])
    }
}

impl Seek for FailingSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
