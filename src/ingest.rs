//! The `run` command: read a flight CSV, clean it, validate it against the
//! declared schema, and persist the binary table.

use anyhow::{Context, Result};
use log::info;

use crate::{cli::RunArgs, io_utils, normalize, schema, store};

pub fn execute(args: &RunArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

    let table = io_utils::read_csv_table(&args.input, delimiter, encoding)
        .with_context(|| format!("Reading flight data from {:?}", args.input))?;
    info!("Loaded {} rows from {:?}", table.len(), args.input);

    let table = normalize::clean(table)?;
    let table = schema::flight_schema().validate(table)?;
    info!("Validated {} rows", table.len());

    store::save(&table, &args.out)?;
    println!("Exported table: {}", args.out.display());
    Ok(())
}
