pub mod cli;
pub mod data;
pub mod error;
pub mod gate;
pub mod ingest;
pub mod io_utils;
pub mod normalize;
pub mod quality;
pub mod report;
pub mod schema;
pub mod store;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands, SchemaArgs};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("flightqc", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => ingest::execute(&args),
        Commands::Report(args) => report::execute(&args),
        Commands::Schema(args) => handle_schema(&args),
    }
}

fn handle_schema(args: &SchemaArgs) -> Result<()> {
    let yaml = schema::flight_schema().to_yaml_string()?;
    match &args.out {
        Some(path) => {
            io_utils::ensure_parent_dir(path)?;
            std::fs::write(path, &yaml).with_context(|| format!("Writing schema to {path:?}"))?;
            println!("Schema written to {}", path.display());
        }
        None => print!("{yaml}"),
    }
    Ok(())
}
