//! Rendering of import results and detected dialects.

use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use lazycsv_ingest::Dialect;
use lazycsv_model::{
    Diagnostic, DiagnosticArg, DiagnosticCategory, Diagnostics, FieldSchema, ImportBatch,
};

use crate::record::Record;

/// Everything one `import` run produced, in emission order.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub source: String,
    pub schema: FieldSchema,
    pub records: Vec<Record>,
    pub failures: Vec<Diagnostics>,
}

impl ImportReport {
    pub fn new(source: &Path, schema: FieldSchema, batch: ImportBatch<Record>) -> Self {
        Self {
            source: source.display().to_string(),
            schema,
            records: batch.models,
            failures: batch.failures,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.failures.iter().flat_map(Diagnostics::iter)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn print_import_summary(report: &ImportReport) {
    println!("Source: {}", report.source);
    println!(
        "Imported: {}  Failed: {}",
        report.records.len(),
        report.failures.len()
    );
    if !report.records.is_empty() {
        println!("{}", records_table(report));
    }
    if report.has_failures() {
        println!();
        println!("Diagnostics:");
        println!("{}", diagnostics_table(report));
    }
}

pub fn records_table(report: &ImportReport) -> Table {
    let mut table = Table::new();
    table.set_header(report.schema.iter().map(|name| header_cell(name)));
    apply_table_style(&mut table);
    for record in &report.records {
        table.add_row(record.values().map(Cell::new));
    }
    table
}

pub fn diagnostics_table(report: &ImportReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Category"),
        header_cell("Key"),
        header_cell("Details"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for diagnostic in report.diagnostics() {
        table.add_row(vec![
            diagnostic.row().map_or_else(|| dim_cell("-"), Cell::new),
            category_cell(diagnostic.category()),
            Cell::new(diagnostic.key()),
            Cell::new(details(diagnostic)),
        ]);
    }
    table
}

pub fn dialect_table(dialect: &Dialect) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    apply_table_style(&mut table);
    let escape = dialect
        .escape
        .map_or_else(|| "-".to_string(), |byte| char::from(byte).to_string());
    table.add_row(vec![
        Cell::new("delimiter"),
        Cell::new(dialect.delimiter_label()),
    ]);
    table.add_row(vec![
        Cell::new("quote"),
        Cell::new(char::from(dialect.quote)),
    ]);
    table.add_row(vec![
        Cell::new("double quote"),
        Cell::new(dialect.double_quote),
    ]);
    table.add_row(vec![Cell::new("escape"), Cell::new(escape)]);
    table.add_row(vec![
        Cell::new("skip initial space"),
        Cell::new(dialect.skip_initial_space),
    ]);
    table
}

/// Arguments after the row number, joined for display.
fn details(diagnostic: &Diagnostic) -> String {
    diagnostic
        .args()
        .iter()
        .skip_while(|arg| matches!(arg, DiagnosticArg::Row(_)))
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn category_cell(category: DiagnosticCategory) -> Cell {
    match category {
        DiagnosticCategory::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        DiagnosticCategory::Validation => Cell::new("VALIDATION").fg(Color::Red),
        DiagnosticCategory::Warning => Cell::new("WARN").fg(Color::Yellow),
        DiagnosticCategory::Info => Cell::new("INFO").fg(Color::Blue),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
