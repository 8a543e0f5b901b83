use crate::error::ReportError;
use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bytes inspected when guessing the delimiter.
pub const SNIFF_LEN: u64 = 4096;

/// One input row: trimmed header name -> trimmed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into().trim().to_string(), v.into().trim().to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub path: PathBuf,
    pub delimiter: char,
    pub total_rows: usize,
    pub skipped_rows: usize,
}

/// `;` when it is strictly more frequent than `,` in the sample, else `,`.
pub fn detect_delimiter(sample: &[u8]) -> u8 {
    let semi = sample.iter().filter(|b| **b == b';').count();
    let comma = sample.iter().filter(|b| **b == b',').count();
    if semi > comma {
        b';'
    } else {
        b','
    }
}

fn resolved(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Read the whole survey file into records.
///
/// The first `SNIFF_LEN` bytes decide the delimiter, then the file is read
/// again from the start. Rows shorter than the header get empty strings for
/// the missing fields; rows the CSV reader cannot decode are skipped and
/// counted in the report.
pub fn load_records(path: &Path) -> Result<(Vec<Record>, LoadReport), ReportError> {
    let input_err = |source: std::io::Error| ReportError::Input {
        path: resolved(path),
        source,
    };

    let mut file = File::open(path).map_err(input_err)?;
    let mut sample = Vec::with_capacity(SNIFF_LEN as usize);
    (&mut file)
        .take(SNIFF_LEN)
        .read_to_end(&mut sample)
        .map_err(input_err)?;
    let delimiter = detect_delimiter(&sample);
    file.seek(SeekFrom::Start(0)).map_err(input_err)?;
    debug!(path = %path.display(), delimiter = %(delimiter as char), "delimiter detected");

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    // An undecodable header means the file itself is unreadable.
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| input_err(e.into()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;
    for result in rdr.records() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "skipping unreadable row");
                skipped_rows += 1;
                continue;
            }
        };
        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), row.get(i).unwrap_or("")))
            .collect();
        records.push(record);
    }

    if records.is_empty() {
        return Err(ReportError::EmptyInput {
            path: resolved(path),
        });
    }

    let report = LoadReport {
        path: resolved(path),
        delimiter: delimiter as char,
        total_rows: records.len(),
        skipped_rows,
    };
    info!(
        rows = report.total_rows,
        skipped = report.skipped_rows,
        delimiter = %report.delimiter,
        "input loaded"
    );
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn semicolon_must_strictly_win() {
        assert_eq!(detect_delimiter(b"a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter(b"a,b;c"), b',');
        assert_eq!(detect_delimiter(b""), b',');
    }

    #[test]
    fn loads_semicolon_file_with_trimmed_keys() {
        let f = write_tmp(" departement ; habitants ;asvp\n 01 ; 1 000,5 ; 2\n");
        let (records, report) = load_records(f.path()).unwrap();
        assert_eq!(report.delimiter, ';');
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("departement"), Some("01"));
        assert_eq!(records[0].get("habitants"), Some("1 000,5"));
        assert_eq!(records[0].get("asvp"), Some("2"));
    }

    #[test]
    fn short_rows_fill_missing_fields_with_empty_strings() {
        let f = write_tmp("departement,habitants,asvp\n02,500\n");
        let (records, _) = load_records(f.path()).unwrap();
        assert_eq!(records[0].get("asvp"), Some(""));
        assert_eq!(records[0].get("nope"), None);
    }

    #[test]
    fn strips_byte_order_mark_from_header() {
        let f = write_tmp("\u{feff}departement,habitants\n03,10\n");
        let (records, _) = load_records(f.path()).unwrap();
        assert_eq!(records[0].get("departement"), Some("03"));
    }

    #[test]
    fn missing_file_is_an_input_error_naming_the_path() {
        let err = load_records(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("exist.csv"));
    }

    #[test]
    fn undecodable_header_is_an_input_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"depart\xff\xfeement,habitants\n01,10\n").unwrap();
        let err = load_records(f.path()).unwrap_err();
        assert!(err.is_input_error());
        assert!(matches!(err, ReportError::Input { .. }));
    }

    #[test]
    fn header_only_file_is_empty_input() {
        let f = write_tmp("departement,habitants\n");
        let err = load_records(f.path()).unwrap_err();
        assert!(matches!(err, ReportError::EmptyInput { .. }));
    }
}
