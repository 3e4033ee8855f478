//! The `report` command: profile a stored table, write the markdown (and
//! optional JSON) report, then apply the quality gate.

use anyhow::{Context, Result, ensure};
use log::info;

use crate::{
    cli::ReportArgs,
    error::PipelineError,
    gate::{self, GateRule, Metric},
    io_utils,
    quality::{self, QualityReport, format_percent},
    store, table,
};

pub fn execute(args: &ReportArgs) -> Result<()> {
    ensure!(args.top >= 1, "--top must be at least 1 (got {})", args.top);

    let stored = store::load(&args.input)?;
    info!("Loaded {} rows from {:?}", stored.len(), args.input);
    let report = quality::compute_quality_report(&stored, args.top);

    print_console(&report, args.top);

    io_utils::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, quality::render_markdown(&report))
        .with_context(|| format!("Writing report to {:?}", args.out))?;
    println!("Report written to {}", args.out.display());

    if let Some(json_path) = &args.json {
        io_utils::ensure_parent_dir(json_path)?;
        let body = serde_json::to_string_pretty(&report).context("Serializing report to JSON")?;
        std::fs::write(json_path, body)
            .with_context(|| format!("Writing JSON report to {json_path:?}"))?;
        println!("JSON report written to {}", json_path.display());
    }

    let failures = gate::evaluate(&report, &gate_rules(args));
    if failures.is_empty() {
        println!("QUALITY GATE PASSED");
        Ok(())
    } else {
        Err(PipelineError::GateFailure(failures).into())
    }
}

/// Threshold flags become gate rules in a fixed order: cancelled rate first,
/// then missing actual_dep, so failure output is stable.
fn gate_rules(args: &ReportArgs) -> Vec<GateRule> {
    let mut rules = Vec::new();
    if let Some(threshold) = args.fail_if_cancelled_rate {
        rules.push(GateRule::new(Metric::CancelledRate, threshold));
    }
    if let Some(threshold) = args.fail_if_missing_actual_dep {
        rules.push(GateRule::new(
            Metric::MissingRate("actual_dep".to_string()),
            threshold,
        ));
    }
    rules
}

fn print_console(report: &QualityReport, top: usize) {
    println!("Rows: {}", report.rows);
    println!("Cancelled rate: {}", format_percent(report.cancelled_rate));
    println!();

    let missing_rows: Vec<Vec<String>> = report
        .missing_rates
        .iter()
        .map(|entry| vec![entry.column.clone(), format_percent(entry.rate)])
        .collect();
    table::print_section("Missing values", &["Column", "Missing rate"], &missing_rows);
    println!();

    let airline_rows: Vec<Vec<String>> = report
        .top_airlines
        .iter()
        .map(|entry| vec![entry.value.clone(), entry.count.to_string()])
        .collect();
    table::print_section(
        &format!("Top airlines (top {top})"),
        &["Airline", "Count"],
        &airline_rows,
    );
    println!();

    let route_rows: Vec<Vec<String>> = report
        .top_routes
        .iter()
        .map(|entry| vec![entry.value.clone(), entry.count.to_string()])
        .collect();
    table::print_section(
        &format!("Top routes (top {top})"),
        &["Route", "Count"],
        &route_rows,
    );
    println!();
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn gate_rules_keep_cancelled_rate_ahead_of_missing_actual_dep() {
        let args = ReportArgs {
            input: PathBuf::from("flights.ftb"),
            out: PathBuf::from("report.md"),
            top: 10,
            json: None,
            fail_if_cancelled_rate: Some(0.3),
            fail_if_missing_actual_dep: Some(0.1),
        };
        let rules = gate_rules(&args);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].metric, Metric::CancelledRate);
        assert_eq!(
            rules[1].metric,
            Metric::MissingRate("actual_dep".to_string())
        );
    }

    #[test]
    fn no_threshold_flags_mean_no_rules() {
        let args = ReportArgs {
            input: PathBuf::from("flights.ftb"),
            out: PathBuf::from("report.md"),
            top: 10,
            json: None,
            fail_if_cancelled_rate: None,
            fail_if_missing_actual_dep: None,
        };
        assert!(gate_rules(&args).is_empty());
    }
}
