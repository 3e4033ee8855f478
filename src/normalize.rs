//! Cleanup pass that runs on freshly ingested tables before validation.
//!
//! Carrier and airport codes are trimmed and uppercased, flight numbers are
//! coerced to trimmed strings, the `cancelled` flag is parsed leniently with
//! anything unparseable treated as 0, and empty actual-time strings become
//! missing cells. Cleaning an already-clean table changes nothing.

use crate::{
    data::{Table, Value},
    error::PipelineError,
};

/// Columns every flight table must carry before cleanup can run, in the
/// order they are checked (the first absent one is reported).
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["airline", "origin", "dest", "flight_number", "cancelled"];

/// Optional wall-clock columns where an empty string means "not recorded".
const ACTUAL_TIME_COLUMNS: [&str; 2] = ["actual_dep", "actual_arr"];

fn require_column(table: &Table, name: &str) -> Result<usize, PipelineError> {
    table
        .column_index(name)
        .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
}

/// Trims and uppercases a code cell, reusing the original string when it is
/// already in canonical form. Non-string cells are stringified first.
fn clean_code(value: Value) -> Value {
    let text = match value {
        Value::String(text) => text,
        other => other.as_display(),
    };
    let trimmed = text.trim();
    if trimmed.len() == text.len() && trimmed.chars().all(|ch| !ch.is_lowercase()) {
        Value::String(text)
    } else {
        Value::String(trimmed.to_uppercase())
    }
}

/// Flight numbers stay strings so identifiers like `0452` keep their
/// leading zeros.
fn clean_flight_number(value: Value) -> Value {
    let text = match value {
        Value::String(text) => text,
        other => other.as_display(),
    };
    let trimmed = text.trim();
    if trimmed.len() == text.len() {
        Value::String(text)
    } else {
        Value::String(trimmed.to_string())
    }
}

/// Lenient integer parse for the `cancelled` flag: integers pass through,
/// numeric strings are truncated toward zero, everything else (missing
/// cells included) becomes 0. Out-of-range values such as 2 are kept so
/// validation can report them.
fn lenient_flag(value: Option<Value>) -> i64 {
    match value {
        Some(Value::Integer(flag)) => flag,
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if let Ok(flag) = trimmed.parse::<i64>() {
                flag
            } else if let Ok(number) = trimmed.parse::<f64>()
                && number.is_finite()
            {
                number.trunc() as i64
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Normalizes a raw flight table in place and returns it.
pub fn clean(mut table: Table) -> Result<Table, PipelineError> {
    let mut indices = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = require_column(&table, name)?;
    }
    let [airline_idx, origin_idx, dest_idx, flight_idx, cancelled_idx] = indices;
    let actual_indices: Vec<usize> = ACTUAL_TIME_COLUMNS
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();

    for row in table.rows_mut() {
        for idx in [airline_idx, origin_idx, dest_idx] {
            if let Some(value) = row[idx].take() {
                row[idx] = Some(clean_code(value));
            }
        }
        if let Some(value) = row[flight_idx].take() {
            row[flight_idx] = Some(clean_flight_number(value));
        }
        row[cancelled_idx] = Some(Value::Integer(lenient_flag(row[cancelled_idx].take())));
        for &idx in &actual_indices {
            if matches!(&row[idx], Some(Value::String(text)) if text.is_empty()) {
                row[idx] = None;
            }
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight_columns() -> Vec<String> {
        ["airline", "flight_number", "origin", "dest", "cancelled", "actual_dep"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn string_row(cells: &[&str]) -> Vec<Option<Value>> {
        cells
            .iter()
            .map(|s| Some(Value::String(s.to_string())))
            .collect()
    }

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        let table = Table::from_rows(
            flight_columns(),
            vec![string_row(&[" af ", " 447 ", "cdg", " Jfk", "0", "08:03"])],
        )
        .unwrap();
        let cleaned = clean(table).unwrap();
        let row = &cleaned.rows()[0];
        assert_eq!(row[0], Some(Value::String("AF".into())));
        assert_eq!(row[1], Some(Value::String("447".into())));
        assert_eq!(row[2], Some(Value::String("CDG".into())));
        assert_eq!(row[3], Some(Value::String("JFK".into())));
    }

    #[test]
    fn flight_number_keeps_leading_zeros() {
        let table = Table::from_rows(
            flight_columns(),
            vec![string_row(&["AF", " 0452 ", "CDG", "JFK", "0", ""])],
        )
        .unwrap();
        let cleaned = clean(table).unwrap();
        assert_eq!(cleaned.rows()[0][1], Some(Value::String("0452".into())));
    }

    #[test]
    fn cancelled_parses_leniently() {
        let cases = [
            ("1", 1),
            ("0", 0),
            (" 1 ", 1),
            ("1.0", 1),
            ("2", 2),
            ("yes", 0),
            ("", 0),
        ];
        for (raw, expected) in cases {
            let table = Table::from_rows(
                flight_columns(),
                vec![string_row(&["AF", "447", "CDG", "JFK", raw, "08:03"])],
            )
            .unwrap();
            let cleaned = clean(table).unwrap();
            assert_eq!(
                cleaned.rows()[0][4],
                Some(Value::Integer(expected)),
                "cancelled={raw:?}"
            );
        }
    }

    #[test]
    fn missing_cancelled_cell_defaults_to_zero() {
        let mut row = string_row(&["AF", "447", "CDG", "JFK", "0", "08:03"]);
        row[4] = None;
        let table = Table::from_rows(flight_columns(), vec![row]).unwrap();
        let cleaned = clean(table).unwrap();
        assert_eq!(cleaned.rows()[0][4], Some(Value::Integer(0)));
    }

    #[test]
    fn empty_actual_time_becomes_missing() {
        let table = Table::from_rows(
            flight_columns(),
            vec![string_row(&["AF", "447", "CDG", "JFK", "0", ""])],
        )
        .unwrap();
        let cleaned = clean(table).unwrap();
        assert_eq!(cleaned.rows()[0][5], None);
    }

    #[test]
    fn absent_required_column_is_an_error() {
        let table = Table::from_rows(
            vec!["airline".to_string(), "origin".to_string()],
            vec![string_row(&["AF", "CDG"])],
        )
        .unwrap();
        let err = clean(table).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref col) if col == "dest"));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let table = Table::from_rows(
            flight_columns(),
            vec![
                string_row(&[" af ", " 0452", "cdg ", "jfk", "1.0", ""]),
                string_row(&["FR", "8822", "BVA", "STN", "0", "09:12"]),
            ],
        )
        .unwrap();
        let once = clean(table).unwrap();
        let twice = clean(once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}
