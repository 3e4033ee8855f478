//! CSV ingestion and filesystem helpers.
//!
//! Delimiters are resolved from the file extension (`.tsv` → tab, everything
//! else comma) with a manual override, input decoding goes through
//! `encoding_rs` and defaults to UTF-8, and the `-` path convention reads
//! standard input.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::data::{Table, Value};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

fn open_csv_reader(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    Ok(builder.from_reader(reader))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Reads a whole delimited file into a raw [`Table`]: every cell arrives as a
/// present string, empty fields included. Downstream stages decide what
/// "missing" means.
pub fn read_csv_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let mut reader = open_csv_reader(path, delimiter)?;
    let headers = reader.byte_headers()?.clone();
    let headers =
        decode_record(&headers, encoding).with_context(|| format!("Decoding headers of {path:?}"))?;
    let mut table = Table::new(headers);

    let mut record = csv::ByteRecord::new();
    let mut row_idx = 0usize;
    loop {
        let more = reader
            .read_byte_record(&mut record)
            .with_context(|| format!("Reading row {} of {path:?}", row_idx + 2))?;
        if !more {
            break;
        }
        let decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {} of {path:?}", row_idx + 2))?;
        let cells = decoded
            .into_iter()
            .map(|field| Some(Value::String(field)))
            .collect();
        table
            .push_row(cells)
            .with_context(|| format!("Reading row {} of {path:?}", row_idx + 2))?;
        row_idx += 1;
    }
    Ok(table)
}

/// Creates the parent directory chain for an output path, so commands can
/// write to locations like `data/processed/` on a fresh checkout.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating parent directory for {path:?}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn delimiter_follows_extension_unless_overridden() {
        assert_eq!(
            resolve_input_delimiter(Path::new("flights.csv"), None),
            DEFAULT_CSV_DELIMITER
        );
        assert_eq!(
            resolve_input_delimiter(Path::new("flights.TSV"), None),
            DEFAULT_TSV_DELIMITER
        );
        assert_eq!(
            resolve_input_delimiter(Path::new("flights.csv"), Some(b';')),
            b';'
        );
    }

    #[test]
    fn resolve_encoding_defaults_to_utf8() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(resolve_encoding(Some("latin1")).unwrap().name(), "windows-1252");
        assert!(resolve_encoding(Some("no-such-encoding")).is_err());
    }

    #[test]
    fn read_csv_table_keeps_empty_fields_as_present_strings() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sample.csv");
        let mut file = File::create(&path).expect("create csv");
        writeln!(file, "airline,actual_dep").unwrap();
        writeln!(file, "AF,08:25").unwrap();
        writeln!(file, "FR,").unwrap();

        let table = read_csv_table(&path, b',', UTF_8).expect("read table");
        assert_eq!(table.columns(), ["airline", "actual_dep"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows()[1][1],
            Some(Value::String(String::new())),
            "empty CSV field is a present empty string, not missing"
        );
    }

    #[test]
    fn ensure_parent_dir_builds_nested_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("a").join("b").join("out.ftb");
        ensure_parent_dir(&target).expect("create parents");
        assert!(target.parent().unwrap().is_dir());
    }
}
