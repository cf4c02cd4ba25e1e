//! Integration tests for the import and sniff commands.

use std::io::Write;

use tempfile::NamedTempFile;

use lazycsv_cli::commands::{ImportRequest, run_import, run_sniff};
use lazycsv_cli::record::{INVALID_INTEGER, Value};
use lazycsv_ingest::ParseOptions;
use lazycsv_model::keys;

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn request(file: &NamedTempFile, integer: &[&str]) -> ImportRequest {
    ImportRequest {
        path: file.path().to_path_buf(),
        fields: vec!["name".into(), "age".into()],
        integer_fields: integer.iter().map(|field| field.to_string()).collect(),
        base64: false,
        options: ParseOptions::default(),
    }
}

#[test]
fn test_import_types_integer_columns() {
    let file = csv_file("name,age\nalice,30\nbob,41\n");
    let report = run_import(&request(&file, &["age"])).unwrap();

    assert!(!report.has_failures());
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[1].get("age"), Some(&Value::Integer(41)));
}

#[test]
fn test_import_halts_on_invalid_integer() {
    let file = csv_file("name,age\nalice,30\nbob,old\ncarol,22\n");
    let report = run_import(&request(&file, &["age"])).unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.failures.len(), 1);
    let diagnostic = report.failures[0].first();
    assert_eq!(diagnostic.key(), INVALID_INTEGER);
    assert_eq!(diagnostic.row(), Some(3));
}

#[test]
fn test_import_without_integer_fields_keeps_text() {
    let file = csv_file("name,age\nalice,thirty\n");
    let report = run_import(&request(&file, &[])).unwrap();

    assert_eq!(
        report.records[0].get("age"),
        Some(&Value::Text("thirty".into()))
    );
}

#[test]
fn test_import_base64_file() {
    let file = csv_file("bmFtZSxhZ2UKYWxpY2UsMzAK\n");
    let mut request = request(&file, &["age"]);
    request.base64 = true;

    let report = run_import(&request).unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].get("name"), Some(&Value::Text("alice".into())));
}

#[test]
fn test_import_missing_field_reported_in_json() {
    let file = csv_file("name,age\nalice,\n");
    let report = run_import(&request(&file, &[])).unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["schema"], serde_json::json!(["name", "age"]));
    assert_eq!(json["records"], serde_json::json!([]));
    assert_eq!(json["failures"][0][0]["key"], keys::MISSING_FIELDS);

    insta::assert_snapshot!(serde_json::to_string_pretty(&report.failures).unwrap(), @r#"
    [
      [
        {
          "category": "validation",
          "key": "import_csv_missing_fields",
          "args": [
            {
              "row": 2
            },
            {
              "fields": [
                "name",
                "age"
              ]
            },
            {
              "fields": [
                "age"
              ]
            }
          ]
        }
      ]
    ]
    "#);
}

#[test]
fn test_import_rejects_unknown_integer_field() {
    let file = csv_file("name,age\nalice,30\n");
    let error = run_import(&request(&file, &["height"])).unwrap_err();
    assert!(error.to_string().contains("height"));
}

#[test]
fn test_import_rejects_duplicate_fields() {
    let file = csv_file("name,age\nalice,30\n");
    let mut request = request(&file, &[]);
    request.fields = vec!["name".into(), "name".into()];
    assert!(run_import(&request).is_err());
}

#[test]
fn test_import_missing_file_is_generic_failure() {
    let dir = tempfile::tempdir().unwrap();
    let request = ImportRequest {
        path: dir.path().join("absent.csv"),
        fields: vec!["name".into()],
        integer_fields: Vec::new(),
        base64: false,
        options: ParseOptions::default(),
    };

    let report = run_import(&request).unwrap();
    assert!(report.records.is_empty());
    assert_eq!(report.failures[0].first().key(), keys::GENERIC_IMPORT_ERROR);
}

#[test]
fn test_sniff_reports_tab_dialect() {
    let file = csv_file("name\tage\nalice\t30\n");
    let dialect = run_sniff(file.path(), 1024).unwrap();
    assert_eq!(dialect.delimiter, b'\t');
    assert_eq!(dialect.delimiter_label(), "\\t");
}

#[test]
fn test_sniff_single_column_fails() {
    let file = csv_file("name\nalice\n");
    assert!(run_sniff(file.path(), 1024).is_err());
}
