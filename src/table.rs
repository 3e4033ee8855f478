//! Plain-text table rendering for the console report sections.

use std::borrow::Cow;
use std::fmt::Write as _;

/// Renders a titled section: the title, a header row, a dashed separator,
/// then one line per row. Columns are sized to their widest cell and joined
/// with a two-space gutter.
pub fn render_section(title: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{title}");
    let _ = writeln!(output, "{}", format_row(headers.iter().copied(), &widths));
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(
        output,
        "{}",
        format_row(separator.iter().map(|s| s.as_str()), &widths)
    );
    for row in rows {
        let _ = writeln!(
            output,
            "{}",
            format_row(row.iter().map(|s| s.as_str()), &widths)
        );
    }
    output
}

pub fn print_section(title: &str, headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_section(title, headers, rows));
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, cell) in cells.enumerate() {
        let Some(&width) = widths.get(idx) else {
            break;
        };
        if idx > 0 {
            line.push_str("  ");
        }
        let sanitized = sanitize_cell(cell);
        let padding = width.saturating_sub(sanitized.chars().count());
        line.push_str(sanitized.as_ref());
        line.push_str(&" ".repeat(padding));
    }
    line.truncate(line.trim_end_matches(' ').len());
    line
}

/// Control characters would break the line-oriented layout, so they render
/// as spaces.
fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(
            value
                .chars()
                .map(|ch| match ch {
                    '\n' | '\r' | '\t' => ' ',
                    other => other,
                })
                .collect(),
        )
    } else {
        Cow::Borrowed(value)
    }
}
