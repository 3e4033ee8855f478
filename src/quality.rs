//! Aggregate quality metrics over a flight table, plus the markdown report
//! body built from them.
//!
//! The analyzer is total: absent columns and empty tables degrade to zero
//! rates and empty rankings instead of erroring, so it can profile tables
//! that never went through validation.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::{Table, Value};

/// Optional columns whose missing fraction is tracked, in report order.
pub const MISSING_RATE_COLUMNS: [&str; 2] = ["actual_dep", "actual_arr"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRate {
    pub column: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub rows: usize,
    pub cancelled_rate: f64,
    pub missing_rates: Vec<ColumnRate>,
    pub top_airlines: Vec<CountEntry>,
    pub top_routes: Vec<CountEntry>,
}

impl QualityReport {
    /// Missing rate for one column, when tracked.
    pub fn missing_rate(&self, column: &str) -> Option<f64> {
        self.missing_rates
            .iter()
            .find(|entry| entry.column == column)
            .map(|entry| entry.rate)
    }
}

/// Occurrence counter that remembers first-encounter order, so equal counts
/// in [`FrequencyCounter::most_common`] rank whichever value appeared first
/// ahead of later ones.
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl FrequencyCounter {
    pub fn add(&mut self, value: String) {
        match self.counts.get_mut(&value) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(value.clone(), 1);
                self.order.push(value);
            }
        }
    }

    /// The `top` highest counts in descending order.
    pub fn most_common(&self, top: usize) -> Vec<CountEntry> {
        let mut entries: Vec<CountEntry> = self
            .order
            .iter()
            .map(|value| CountEntry {
                value: value.clone(),
                count: self.counts[value],
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(top);
        entries
    }
}

/// Mean of the cancelled flags over rows where the flag is a present
/// integer; 0.0 when nothing qualifies, so the report never carries NaN.
/// The sum accumulates in f64, so a stored table holding arbitrary integers
/// cannot overflow it.
fn cancelled_rate(table: &Table) -> f64 {
    let Some(cells) = table.column_cells("cancelled") else {
        return 0.0;
    };
    let mut sum = 0.0f64;
    let mut counted = 0usize;
    for cell in cells {
        if let Some(value) = cell
            && let Some(flag) = value.as_integer()
        {
            sum += flag as f64;
            counted += 1;
        }
    }
    if counted == 0 { 0.0 } else { sum / counted as f64 }
}

fn missing_fraction<'a>(cells: impl Iterator<Item = &'a Option<Value>>, rows: usize) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    let missing = cells.filter(|cell| cell.is_none()).count();
    missing as f64 / rows as f64
}

/// Profiles a table into a [`QualityReport`] with rankings truncated to
/// `top_n` entries.
pub fn compute_quality_report(table: &Table, top_n: usize) -> QualityReport {
    let rows = table.len();

    let missing_rates = MISSING_RATE_COLUMNS
        .iter()
        .filter_map(|column| {
            table.column_cells(column).map(|cells| ColumnRate {
                column: column.to_string(),
                rate: missing_fraction(cells, rows),
            })
        })
        .collect();

    let top_airlines = match table.column_cells("airline") {
        Some(cells) => {
            let mut counter = FrequencyCounter::default();
            for value in cells.flatten() {
                counter.add(value.as_display());
            }
            counter.most_common(top_n)
        }
        None => Vec::new(),
    };

    let top_routes = match (table.column_index("origin"), table.column_index("dest")) {
        (Some(origin_idx), Some(dest_idx)) => {
            let mut counter = FrequencyCounter::default();
            for row in table.rows() {
                if let (Some(origin), Some(dest)) = (&row[origin_idx], &row[dest_idx]) {
                    counter.add(format!(
                        "{}→{}",
                        origin.as_display().to_uppercase(),
                        dest.as_display().to_uppercase()
                    ));
                }
            }
            counter.most_common(top_n)
        }
        _ => Vec::new(),
    };

    QualityReport {
        rows,
        cancelled_rate: cancelled_rate(table),
        missing_rates,
        top_airlines,
        top_routes,
    }
}

/// Formats a fraction the way the report prints rates: `1.0 / 3.0` becomes
/// `33.33%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Renders the markdown report document, trailing newline included.
pub fn render_markdown(report: &QualityReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("# Flight Data Quality Report".to_string());
    lines.push(String::new());
    lines.push(format!("- **Rows**: {}", report.rows));
    lines.push(format!(
        "- **Cancelled rate**: {}",
        format_percent(report.cancelled_rate)
    ));
    lines.push(String::new());
    lines.push("## Missing values".to_string());
    if report.missing_rates.is_empty() {
        lines.push("- (no columns found)".to_string());
    } else {
        for entry in &report.missing_rates {
            lines.push(format!(
                "- **{}**: {}",
                entry.column,
                format_percent(entry.rate)
            ));
        }
    }
    lines.push(String::new());
    lines.push("## Top airlines".to_string());
    if report.top_airlines.is_empty() {
        lines.push("- (no data)".to_string());
    } else {
        for entry in &report.top_airlines {
            lines.push(format!("- {}: {}", entry.value, entry.count));
        }
    }
    lines.push(String::new());
    lines.push("## Top routes".to_string());
    if report.top_routes.is_empty() {
        lines.push("- (no data)".to_string());
    } else {
        for entry in &report.top_routes {
            lines.push(format!("- {}: {}", entry.value, entry.count));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}
