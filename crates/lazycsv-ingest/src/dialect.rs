//! CSV dialect detection.
//!
//! A dialect is inferred from a bounded sample at the start of the source:
//! the quote character first (so delimiters inside quoted fields are not
//! counted), then the delimiter, then escaping and initial-space handling.
//! The source is rewound afterwards so the row reader starts from byte 0.

use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom};

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Default number of characters sampled for dialect detection.
pub const DEFAULT_SAMPLE_SIZE: usize = 1024;

/// Delimiters in order of preference.
const DELIMITER_CANDIDATES: [u8; 5] = [b',', b'\t', b';', b'|', b':'];

/// Minimum share of sampled records that must agree on the delimiter count.
const MIN_CONSISTENCY: f64 = 0.9;

/// Delimiter and quoting conventions of a CSV source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
    pub double_quote: bool,
    pub escape: Option<u8>,
    /// Drop spaces that directly follow a delimiter. Trailing spaces are kept.
    pub skip_initial_space: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            double_quote: true,
            escape: None,
            skip_initial_space: false,
        }
    }
}

impl Dialect {
    /// Reader configured for this dialect.
    ///
    /// Headers are never consumed by the reader and rows may have any number
    /// of columns. Both are handled by the row binder, as is
    /// `skip_initial_space`.
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(self.double_quote)
            .escape(self.escape);
        builder
    }

    /// Printable form of the delimiter (`\t` for tabs).
    pub fn delimiter_label(&self) -> String {
        match self.delimiter {
            b'\t' => "\\t".to_string(),
            other => char::from(other).to_string(),
        }
    }
}

/// Leading characters of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub text: String,
    /// True when the sample holds the entire source.
    pub complete: bool,
}

/// Reads up to `max_chars` characters from the current position.
pub fn read_sample<R: Read>(source: &mut R, max_chars: usize) -> Result<Sample> {
    let limit = max_chars.saturating_mul(4);
    let mut bytes = Vec::with_capacity(limit.min(64 * 1024));
    source
        .take(limit as u64)
        .read_to_end(&mut bytes)
        .map_err(IngestError::Read)?;
    let exhausted = bytes.len() < limit;

    let text = match std::str::from_utf8(&bytes) {
        Ok(text) => text,
        // The byte limit fell inside a multi-byte character.
        Err(err) if err.error_len().is_none() && !exhausted => {
            std::str::from_utf8(&bytes[..err.valid_up_to()]).map_err(IngestError::InvalidUtf8)?
        }
        Err(err) => return Err(IngestError::InvalidUtf8(err)),
    };

    let (text, complete) = match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (&text[..idx], false),
        None => (text, exhausted),
    };
    Ok(Sample {
        text: text.to_string(),
        complete,
    })
}

/// Samples `source`, infers its dialect, and rewinds it to the start.
pub fn sniff_dialect<R: Read + Seek>(source: &mut R, sample_size: usize) -> Result<Dialect> {
    let sample = read_sample(source, sample_size)?;
    source.seek(SeekFrom::Start(0)).map_err(IngestError::Seek)?;
    detect_dialect_in(&sample.text, sample.complete)
}

/// Infers the dialect of a complete CSV text.
pub fn detect_dialect(sample: &str) -> Result<Dialect> {
    detect_dialect_in(sample, true)
}

fn detect_dialect_in(text: &str, complete: bool) -> Result<Dialect> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let quote = detect_quote(text);
    let records = split_records(text, quote, complete);
    if records.is_empty() {
        return Err(IngestError::DialectUndetermined {
            reason: "sample contains no rows".to_string(),
        });
    }

    let delimiter =
        detect_delimiter(&records, quote).ok_or_else(|| IngestError::DialectUndetermined {
            reason: "could not determine delimiter".to_string(),
        })?;

    let escaped_quote = format!("\\{}", char::from(quote));
    let escape = text.contains(&escaped_quote).then_some(b'\\');

    Ok(Dialect {
        delimiter,
        quote,
        double_quote: true,
        escape,
        skip_initial_space: detect_initial_space(&records, delimiter, quote),
    })
}

/// Picks `'` only when it opens more fields than `"` does.
fn detect_quote(text: &str) -> u8 {
    if opening_quotes(text, b'\'') > opening_quotes(text, b'"') {
        b'\''
    } else {
        b'"'
    }
}

/// Counts `quote` bytes that sit at the start of a field.
fn opening_quotes(text: &str, quote: u8) -> usize {
    let mut prev: Option<u8> = None;
    let mut count = 0;
    for &byte in text.as_bytes() {
        let at_field_start = prev.is_none_or(|p| {
            p == b'\n' || p == b'\r' || DELIMITER_CANDIDATES.contains(&p)
        });
        if byte == quote && at_field_start {
            count += 1;
        }
        if byte != b' ' {
            prev = Some(byte);
        }
    }
    count
}

/// Splits on newlines outside quotes and drops blank records.
///
/// An incomplete sample loses its trailing, unterminated record unless it is
/// the only one.
fn split_records(text: &str, quote: u8, complete: bool) -> Vec<&str> {
    let mut records = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (idx, &byte) in text.as_bytes().iter().enumerate() {
        if byte == quote {
            in_quotes = !in_quotes;
        } else if byte == b'\n' && !in_quotes {
            records.push(&text[start..idx]);
            start = idx + 1;
        }
    }
    if start < text.len() && (complete || records.is_empty()) {
        records.push(&text[start..]);
    }
    records
        .into_iter()
        .map(|record| record.trim_end_matches('\r'))
        .filter(|record| !record.trim().is_empty())
        .collect()
}

fn count_outside_quotes(record: &str, delimiter: u8, quote: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for &byte in record.as_bytes() {
        if byte == quote {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Share of records whose delimiter count equals the most common count.
fn consistency(counts: &[usize]) -> f64 {
    let mut frequency: BTreeMap<usize, usize> = BTreeMap::new();
    for &count in counts {
        *frequency.entry(count).or_default() += 1;
    }
    let mode = frequency.values().copied().max().unwrap_or(0);
    mode as f64 / counts.len() as f64
}

/// The first candidate, in preference order, that occurs in every record with
/// a consistent count wins. Failing that, the candidate present in the most
/// records is used so ragged rows still reach the row checks.
fn detect_delimiter(records: &[&str], quote: u8) -> Option<u8> {
    let mut fallback: Option<(u8, usize)> = None;
    for &candidate in &DELIMITER_CANDIDATES {
        let counts: Vec<usize> = records
            .iter()
            .map(|record| count_outside_quotes(record, candidate, quote))
            .collect();
        let present = counts.iter().filter(|&&count| count > 0).count();
        if present == 0 {
            continue;
        }
        if present == counts.len() && consistency(&counts) >= MIN_CONSISTENCY {
            return Some(candidate);
        }
        if fallback.is_none_or(|(_, best)| present > best) {
            fallback = Some((candidate, present));
        }
    }
    fallback.map(|(candidate, _)| candidate)
}

/// True when every delimiter outside quotes is followed by a space.
fn detect_initial_space(records: &[&str], delimiter: u8, quote: u8) -> bool {
    let mut seen = false;
    for record in records {
        let bytes = record.as_bytes();
        let mut in_quotes = false;
        for (idx, &byte) in bytes.iter().enumerate() {
            if byte == quote {
                in_quotes = !in_quotes;
            } else if byte == delimiter && !in_quotes {
                seen = true;
                if bytes.get(idx + 1) != Some(&b' ') {
                    return false;
                }
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detect_comma() {
        let dialect = detect_dialect("name,age\nalice,30\nbob,41\n").unwrap();
        assert_eq!(dialect.delimiter, b',');
        assert_eq!(dialect.quote, b'"');
        assert!(!dialect.skip_initial_space);
    }

    #[test]
    fn test_detect_semicolon_and_tab() {
        assert_eq!(detect_dialect("a;b\n1;2\n").unwrap().delimiter, b';');
        assert_eq!(detect_dialect("a\tb\n1\t2\n").unwrap().delimiter, b'\t');
        assert_eq!(detect_dialect("a|b|c\n1|2|3\n").unwrap().delimiter, b'|');
    }

    #[test]
    fn test_delimiters_inside_quotes_are_ignored() {
        let dialect = detect_dialect("name;note\n\"smith, j\";\"a, b, c\"\nbob;x\n").unwrap();
        assert_eq!(dialect.delimiter, b';');
    }

    #[test]
    fn test_consistent_candidate_beats_preferred_one() {
        // Commas appear in every row but inconsistently; semicolons are steady.
        let text = "a;b,x\n1;2,y,z\n3;4,w,v,u\n";
        assert_eq!(detect_dialect(text).unwrap().delimiter, b';');
    }

    #[test]
    fn test_inconsistent_rows_fall_back_to_preference_order() {
        let dialect = detect_dialect("name,age\nalice,30\nbob,41,extra\n").unwrap();
        assert_eq!(dialect.delimiter, b',');
    }

    #[test]
    fn test_rows_without_delimiter_do_not_veto() {
        let dialect = detect_dialect("name,age\nalice,30\nbob\n").unwrap();
        assert_eq!(dialect.delimiter, b',');
    }

    #[test]
    fn test_single_quote_detection() {
        let dialect = detect_dialect("'name','age'\n'o,brien','30'\n").unwrap();
        assert_eq!(dialect.quote, b'\'');
        assert_eq!(dialect.delimiter, b',');
    }

    #[test]
    fn test_apostrophes_do_not_switch_quote() {
        let dialect = detect_dialect("name,age\nO'Brien,30\n").unwrap();
        assert_eq!(dialect.quote, b'"');
    }

    #[test]
    fn test_initial_space() {
        let dialect = detect_dialect("name, age\nalice, 30\n").unwrap();
        assert!(dialect.skip_initial_space);
    }

    #[test]
    fn test_escape_detection() {
        let dialect = detect_dialect("a,b\n\"say \\\"hi\\\"\",2\n").unwrap();
        assert_eq!(dialect.escape, Some(b'\\'));
    }

    #[test]
    fn test_empty_sample_fails() {
        let err = detect_dialect("").unwrap_err();
        assert!(matches!(err, IngestError::DialectUndetermined { .. }));
        assert!(detect_dialect("\n\n").is_err());
    }

    #[test]
    fn test_single_column_fails() {
        let err = detect_dialect("name\nalice\nbob\n").unwrap_err();
        assert!(err.to_string().contains("could not determine delimiter"));
    }

    #[test]
    fn test_incomplete_sample_drops_partial_record() {
        // The cut-off last record has no comma; it must not veto the delimiter.
        let records = split_records("a,b\n1,2\n3", b'"', false);
        assert_eq!(records, vec!["a,b", "1,2"]);
        assert_eq!(detect_dialect_in("a,b\n1,2\n3", false).unwrap().delimiter, b',');
    }

    #[test]
    fn test_read_sample_stops_at_char_limit() {
        let mut source = Cursor::new("ééééé".as_bytes().to_vec());
        let sample = read_sample(&mut source, 3).unwrap();
        assert_eq!(sample.text, "ééé");
        assert!(!sample.complete);

        let mut source = Cursor::new(b"ab".to_vec());
        let sample = read_sample(&mut source, 3).unwrap();
        assert_eq!(sample.text, "ab");
        assert!(sample.complete);
    }

    #[test]
    fn test_read_sample_rejects_invalid_utf8() {
        let mut source = Cursor::new(vec![b'a', 0xFF, b'b']);
        let err = read_sample(&mut source, 10).unwrap_err();
        assert!(matches!(err, IngestError::InvalidUtf8(_)));
    }

    #[test]
    fn test_sniff_rewinds_source() {
        let mut source = Cursor::new(b"a,b\n1,2\n".to_vec());
        let dialect = sniff_dialect(&mut source, DEFAULT_SAMPLE_SIZE).unwrap();
        assert_eq!(dialect.delimiter, b',');
        assert_eq!(source.position(), 0);
    }

    #[test]
    fn test_delimiter_label() {
        let dialect = Dialect {
            delimiter: b'\t',
            ..Dialect::default()
        };
        assert_eq!(dialect.delimiter_label(), "\\t");
        assert_eq!(Dialect::default().delimiter_label(), ",");
    }
}
