//! Whole-file binary persistence for validated tables.
//!
//! The on-disk layout is column-major: a format version, the row count, then
//! one named value vector per column. Files are written and read in a single
//! operation; there is no streaming or partial update.

use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::Path,
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::{
    data::{Table, Value},
    io_utils,
};

pub const TABLE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredColumn {
    name: String,
    values: Vec<Option<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTable {
    version: u32,
    rows: usize,
    columns: Vec<StoredColumn>,
}

pub fn save(table: &Table, path: &Path) -> Result<()> {
    let stored = StoredTable {
        version: TABLE_FORMAT_VERSION,
        rows: table.len(),
        columns: table
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| StoredColumn {
                name: name.clone(),
                values: table.rows().iter().map(|row| row[idx].clone()).collect(),
            })
            .collect(),
    };

    io_utils::ensure_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("Creating table file {path:?}"))?;
    let mut writer = BufWriter::new(file);
    bincode::serde::encode_into_std_write(&stored, &mut writer, bincode::config::standard())
        .with_context(|| format!("Writing table file {path:?}"))?;
    writer
        .flush()
        .with_context(|| format!("Flushing table file {path:?}"))?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path).with_context(|| format!("Opening table file {path:?}"))?;
    let (stored, _): (StoredTable, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
            .with_context(|| format!("Reading table file {path:?}"))?;

    if stored.version != TABLE_FORMAT_VERSION {
        bail!(
            "Unsupported table file version {} (expected {TABLE_FORMAT_VERSION})",
            stored.version
        );
    }
    for column in &stored.columns {
        if column.values.len() != stored.rows {
            bail!(
                "Corrupt table file {path:?}: column '{}' holds {} values for {} rows",
                column.name,
                column.values.len(),
                stored.rows
            );
        }
    }

    let columns: Vec<String> = stored.columns.iter().map(|c| c.name.clone()).collect();
    let mut rows: Vec<Vec<Option<Value>>> = (0..stored.rows)
        .map(|_| Vec::with_capacity(columns.len()))
        .collect();
    for column in stored.columns {
        for (row, value) in rows.iter_mut().zip(column.values) {
            row.push(value);
        }
    }
    Table::from_rows(columns, rows)
}
