use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Flight data quality pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean and validate a flight CSV, then persist the binary table
    Run(RunArgs),
    /// Profile a persisted table and apply quality-gate thresholds
    Report(ReportArgs),
    /// Print the declared flight table schema as YAML
    Schema(SchemaArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Input CSV file ('-' reads from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output table file
    #[arg(short = 'o', long = "out", default_value = "data/processed/flights.ftb")]
    pub out: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Table file produced by `run`
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output Markdown report
    #[arg(short = 'o', long = "out", default_value = "reports/quality_report.md")]
    pub out: PathBuf,
    /// How many airlines and routes to rank
    #[arg(long, default_value_t = 10)]
    pub top: usize,
    /// Also write the report as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
    /// Fail when the cancelled rate exceeds this fraction (0..1)
    #[arg(long = "fail-if-cancelled-rate")]
    pub fail_if_cancelled_rate: Option<f64>,
    /// Fail when the missing rate of actual_dep exceeds this fraction (0..1)
    #[arg(long = "fail-if-missing-actual-dep")]
    pub fail_if_missing_actual_dep: Option<f64>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Write the YAML to this file instead of stdout
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
