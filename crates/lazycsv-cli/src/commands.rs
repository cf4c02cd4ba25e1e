use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use lazycsv_ingest::{Dialect, LazyCsvParser, ParseOptions, sniff_dialect};
use lazycsv_model::{FieldSchema, ImportBatch};

use crate::record::RecordAdapter;
use crate::report::ImportReport;

/// Inputs of one `import` run.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub path: PathBuf,
    pub fields: Vec<String>,
    pub integer_fields: Vec<String>,
    /// Treat the file's content as base64 text.
    pub base64: bool,
    pub options: ParseOptions,
}

pub fn run_import(request: &ImportRequest) -> Result<ImportReport> {
    let schema = FieldSchema::new(request.fields.iter().cloned()).context("invalid --fields")?;
    for field in &request.integer_fields {
        anyhow::ensure!(
            schema.position(field).is_some(),
            "--integer names unknown field '{field}'"
        );
    }
    let parser = LazyCsvParser::with_schema(
        RecordAdapter::new(request.integer_fields.iter().cloned()),
        schema.clone(),
    );

    let batch: ImportBatch<_> = if request.base64 {
        let content = fs::read_to_string(&request.path)
            .with_context(|| format!("read {}", request.path.display()))?;
        parser
            .parse_base64_with_options(content, &request.options)
            .collect()
    } else {
        parser
            .parse_path_with_options(&request.path, &request.options)
            .collect()
    };

    info!(
        imported = batch.models.len(),
        failed = batch.failures.len(),
        "import complete"
    );
    Ok(ImportReport::new(&request.path, schema, batch))
}

pub fn run_sniff(path: &Path, sample_size: usize) -> Result<Dialect> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    sniff_dialect(&mut file, sample_size)
        .with_context(|| format!("sniff dialect of {}", path.display()))
}
