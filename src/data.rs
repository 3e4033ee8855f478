use std::fmt;

use anyhow::{Result, anyhow, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single typed cell value.
///
/// A cell in a [`Table`] is `Option<Value>`: `None` is the explicit missing
/// marker and is distinct from `Some(Value::String(String::new()))`, which is
/// a present-but-empty field as read from CSV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Value {
    String(String),
    Integer(i64),
    Date(NaiveDate),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// An ordered set of named columns plus rows of typed cells.
///
/// Every row has exactly one cell per column, positionally aligned with the
/// column list. Both pipeline phases operate on this one representation: the
/// `run` phase fills it from CSV text, the `report` phase from the stored
/// binary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<Value>>>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            ensure!(
                row.len() == columns.len(),
                "Row {} has {} cell(s) but the table declares {} column(s)",
                idx,
                row.len(),
                columns.len()
            );
        }
        Ok(Table { columns, rows })
    }

    pub fn push_row(&mut self, row: Vec<Option<Value>>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(anyhow!(
                "Row {} has {} cell(s) but the table declares {} column(s)",
                self.rows.len(),
                row.len(),
                self.columns.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    /// Mutable access to the row cells for in-place rewrites. The slice
    /// keeps callers from adding or removing whole rows.
    pub fn rows_mut(&mut self) -> &mut [Vec<Option<Value>>] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterates the cells of one column, top to bottom. `None` when the
    /// column does not exist.
    pub fn column_cells<'a>(
        &'a self,
        name: &str,
    ) -> Option<impl Iterator<Item = &'a Option<Value>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(parse_naive_date("2026-02-01").unwrap(), expected);
        assert_eq!(parse_naive_date("01/02/2026").unwrap(), expected);
        assert_eq!(parse_naive_date("2026/02/01").unwrap(), expected);
        assert_eq!(parse_naive_date("01-02-2026").unwrap(), expected);
        assert!(parse_naive_date("not a date").is_err());
    }

    #[test]
    fn table_rejects_ragged_rows() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table
            .push_row(vec![
                Some(Value::Integer(1)),
                Some(Value::String("x".into())),
            ])
            .expect("matching width");
        let err = table
            .push_row(vec![Some(Value::Integer(2))])
            .expect_err("short row");
        assert!(err.to_string().contains("1 cell(s)"));
    }

    #[test]
    fn column_cells_walks_one_column() {
        let table = Table::from_rows(
            vec!["airline".to_string(), "cancelled".to_string()],
            vec![
                vec![Some(Value::String("AF".into())), Some(Value::Integer(0))],
                vec![Some(Value::String("FR".into())), Some(Value::Integer(1))],
            ],
        )
        .expect("table");
        let cancelled: Vec<_> = table
            .column_cells("cancelled")
            .expect("column exists")
            .collect();
        assert_eq!(cancelled[0], &Some(Value::Integer(0)));
        assert_eq!(cancelled[1], &Some(Value::Integer(1)));
        assert!(table.column_cells("unknown").is_none());
    }

    #[test]
    fn value_display_keeps_date_format() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(Value::Date(date).as_display(), "2026-02-01");
        assert_eq!(Value::Integer(42).to_string(), "42");
    }
}
