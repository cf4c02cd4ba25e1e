//! Contract for the domain-specific half of an import.

use lazycsv_model::{Diagnostic, RawRow};

/// Validates raw rows against domain rules and converts them into models.
///
/// The pipeline only calls [`RowAdapter::convert`] for rows that passed the
/// structural checks and for which [`RowAdapter::validate`] returned nothing.
pub trait RowAdapter {
    type Model;
    type Error: std::error::Error;

    /// Domain-rule violations for `row`, in reporting order. Empty means valid.
    fn validate(&self, row: &RawRow, row_number: u64) -> Vec<Diagnostic>;

    fn convert(&self, row: &RawRow) -> Result<Self::Model, Self::Error>;
}

impl<A: RowAdapter + ?Sized> RowAdapter for &A {
    type Model = A::Model;
    type Error = A::Error;

    fn validate(&self, row: &RawRow, row_number: u64) -> Vec<Diagnostic> {
        (**self).validate(row, row_number)
    }

    fn convert(&self, row: &RawRow) -> Result<Self::Model, Self::Error> {
        (**self).convert(row)
    }
}

impl<A: RowAdapter + ?Sized> RowAdapter for Box<A> {
    type Model = A::Model;
    type Error = A::Error;

    fn validate(&self, row: &RawRow, row_number: u64) -> Vec<Diagnostic> {
        (**self).validate(row, row_number)
    }

    fn convert(&self, row: &RawRow) -> Result<Self::Model, Self::Error> {
        (**self).convert(row)
    }
}
