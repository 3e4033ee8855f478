//! Declarative table schema and the batch validation engine.
//!
//! A [`TableSchema`] is a list of per-column rules plus cross-column row
//! checks, evaluated uniformly: every rule runs against every row and all
//! failures are collected into one [`Violation`] list instead of stopping at
//! the first bad cell. Validation coerces cells to their declared type first
//! (string dates become [`Value::Date`], integer-like strings become
//! [`Value::Integer`]) and returns the coerced table on success.
//!
//! The schema is strict: columns not in the declared set are violations,
//! duplicated column names are violations, and declared columns missing from
//! the table abort validation outright.

use std::fmt;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Table, Value, parse_naive_date},
    error::PipelineError,
};

/// Declared type of a column; validation coerces cells toward it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Date,
}

impl ColumnType {
    /// Coerces a cell to this type, handing the value back untouched when it
    /// cannot be represented.
    fn coerce(self, value: Value) -> std::result::Result<Value, Value> {
        match self {
            ColumnType::String => match value {
                Value::String(_) => Ok(value),
                other => Ok(Value::String(other.as_display())),
            },
            ColumnType::Integer => match value {
                Value::Integer(_) => Ok(value),
                Value::String(ref text) => match text.trim().parse::<i64>() {
                    Ok(parsed) => Ok(Value::Integer(parsed)),
                    Err(_) => Err(value),
                },
                Value::Date(_) => Err(value),
            },
            ColumnType::Date => match value {
                Value::Date(_) => Ok(value),
                Value::String(ref text) => match parse_naive_date(text.trim()) {
                    Ok(parsed) => Ok(Value::Date(parsed)),
                    Err(_) => Err(value),
                },
                Value::Integer(_) => Err(value),
            },
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Date => "date",
        };
        f.write_str(label)
    }
}

/// Value-level check applied to one coerced cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    LengthBetween { min: usize, max: usize },
    OneOf(Vec<i64>),
}

impl Check {
    /// Returns the failure message when the cell violates this check.
    fn violation_message(&self, value: &Value) -> Option<String> {
        match self {
            Check::LengthBetween { min, max } => {
                let length = value.as_str().map_or(0, |text| text.chars().count());
                if length < *min || length > *max {
                    Some(if min == max {
                        format!("length must be exactly {min}")
                    } else {
                        format!("length must be between {min} and {max}")
                    })
                } else {
                    None
                }
            }
            Check::OneOf(allowed) => {
                let ok = value.as_integer().is_some_and(|n| allowed.contains(&n));
                if ok {
                    None
                } else {
                    Some(format!("must be one of [{}]", allowed.iter().join(", ")))
                }
            }
        }
    }
}

/// Cross-column check evaluated once per row on the coerced cells. Missing
/// cells are skipped; nullability is the column rule's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCheck {
    UppercaseLength { column: String, length: usize },
    ColumnsDiffer { left: String, right: String },
}

impl RowCheck {
    pub fn describe(&self) -> String {
        match self {
            RowCheck::UppercaseLength { column, length } => {
                format!("{column} must be {length} letters")
            }
            RowCheck::ColumnsDiffer { left, right } => format!("{left} != {right}"),
        }
    }

    /// Column a failure of this check is attributed to.
    fn column(&self) -> &str {
        match self {
            RowCheck::UppercaseLength { column, .. } => column,
            RowCheck::ColumnsDiffer { left, .. } => left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub name: String,
    pub datatype: ColumnType,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<Check>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_checks: Vec<RowCheck>,
}

/// One rule failure at a specific place in the table. `row` is the 0-based
/// data row; table-level failures (such as unexpected columns) carry no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub row: Option<usize>,
    pub column: String,
    pub message: String,
}

impl Violation {
    fn at(row: usize, column: &str, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            column: column.to_string(),
            message: message.into(),
        }
    }

    fn table_level(column: &str, message: impl Into<String>) -> Self {
        Self {
            row: None,
            column: column.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {row}, column '{}': {}", self.column, self.message),
            None => write!(f, "column '{}': {}", self.column, self.message),
        }
    }
}

impl TableSchema {
    /// Validates and coerces a table against this schema.
    ///
    /// All rules run against all rows; the error side carries every
    /// violation found, ordered by declared column (then row) with
    /// table-level findings first, so reports are deterministic. A declared
    /// column that is absent altogether aborts immediately instead.
    pub fn validate(&self, mut table: Table) -> std::result::Result<Table, PipelineError> {
        let mut violations = Vec::new();

        for (idx, name) in table.columns().iter().enumerate() {
            if !self.columns.iter().any(|rule| rule.name == *name) {
                violations.push(Violation::table_level(name, "not part of the declared schema"));
            } else if table.columns()[..idx].contains(name) {
                // Rules bind to the first occurrence; a repeat would carry
                // cells no rule ever sees.
                violations.push(Violation::table_level(
                    name,
                    "appears more than once in the table",
                ));
            }
        }

        let mut indices = Vec::with_capacity(self.columns.len());
        for rule in &self.columns {
            match table.column_index(&rule.name) {
                Some(idx) => indices.push(idx),
                None => return Err(PipelineError::MissingColumn(rule.name.clone())),
            }
        }

        for (rule, &idx) in self.columns.iter().zip(&indices) {
            for (row_idx, row) in table.rows_mut().iter_mut().enumerate() {
                match row[idx].take() {
                    None => {
                        if !rule.nullable {
                            violations.push(Violation::at(row_idx, &rule.name, "value is missing"));
                        }
                    }
                    Some(value) => match rule.datatype.coerce(value) {
                        Ok(coerced) => {
                            for check in &rule.checks {
                                if let Some(message) = check.violation_message(&coerced) {
                                    violations.push(Violation::at(row_idx, &rule.name, message));
                                }
                            }
                            row[idx] = Some(coerced);
                        }
                        Err(original) => {
                            violations.push(Violation::at(
                                row_idx,
                                &rule.name,
                                format!(
                                    "'{}' is not a valid {}",
                                    original.as_display(),
                                    rule.datatype
                                ),
                            ));
                            row[idx] = Some(original);
                        }
                    },
                }
            }
        }

        for check in &self.row_checks {
            self.run_row_check(&table, check, &mut violations);
        }

        if violations.is_empty() {
            Ok(table)
        } else {
            Err(PipelineError::SchemaViolations(violations))
        }
    }

    fn run_row_check(&self, table: &Table, check: &RowCheck, violations: &mut Vec<Violation>) {
        match check {
            RowCheck::UppercaseLength { column, length } => {
                let Some(idx) = table.column_index(column) else {
                    return;
                };
                for (row_idx, row) in table.rows().iter().enumerate() {
                    if let Some(value) = &row[idx]
                        && let Some(text) = value.as_str()
                        && text.to_uppercase().chars().count() != *length
                    {
                        violations.push(Violation::at(row_idx, check.column(), check.describe()));
                    }
                }
            }
            RowCheck::ColumnsDiffer { left, right } => {
                let Some(left_idx) = table.column_index(left) else {
                    return;
                };
                let Some(right_idx) = table.column_index(right) else {
                    return;
                };
                for (row_idx, row) in table.rows().iter().enumerate() {
                    if let (Some(lhs), Some(rhs)) = (&row[left_idx], &row[right_idx])
                        && let (Some(lhs), Some(rhs)) = (lhs.as_str(), rhs.as_str())
                        && lhs.to_uppercase() == rhs.to_uppercase()
                    {
                        violations.push(Violation::at(row_idx, check.column(), check.describe()));
                    }
                }
            }
        }
    }

    /// Renders the schema as YAML, the shape `flightqc schema` prints.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing schema to YAML")
    }
}

fn rule(name: &str, datatype: ColumnType, nullable: bool, checks: Vec<Check>) -> ColumnRule {
    ColumnRule {
        name: name.to_string(),
        datatype,
        nullable,
        checks,
    }
}

/// The flight-table schema: ten declared columns plus three cross-column
/// row checks.
pub fn flight_schema() -> TableSchema {
    TableSchema {
        columns: vec![
            rule("flight_date", ColumnType::Date, false, Vec::new()),
            rule(
                "airline",
                ColumnType::String,
                false,
                vec![Check::LengthBetween { min: 2, max: 6 }],
            ),
            rule(
                "flight_number",
                ColumnType::String,
                false,
                vec![Check::LengthBetween { min: 1, max: 10 }],
            ),
            rule(
                "origin",
                ColumnType::String,
                false,
                vec![Check::LengthBetween { min: 3, max: 3 }],
            ),
            rule(
                "dest",
                ColumnType::String,
                false,
                vec![Check::LengthBetween { min: 3, max: 3 }],
            ),
            rule("scheduled_dep", ColumnType::String, false, Vec::new()),
            rule("actual_dep", ColumnType::String, true, Vec::new()),
            rule("scheduled_arr", ColumnType::String, false, Vec::new()),
            rule("actual_arr", ColumnType::String, true, Vec::new()),
            rule(
                "cancelled",
                ColumnType::Integer,
                false,
                vec![Check::OneOf(vec![0, 1])],
            ),
        ],
        row_checks: vec![
            RowCheck::UppercaseLength {
                column: "origin".to_string(),
                length: 3,
            },
            RowCheck::UppercaseLength {
                column: "dest".to_string(),
                length: 3,
            },
            RowCheck::ColumnsDiffer {
                left: "origin".to_string(),
                right: "dest".to_string(),
            },
        ],
    }
}
