//! unnest: Flatten nested JSON records into a single table
//!
//! Usage:
//!   # Read a JSON array from a file, write one row per line to stdout
//!   unnest data.json
//!
//!   # Read from stdin, keep only what is needed for two columns
//!   cat placements.json | unnest --columns id,campaign_name
//!
//!   # Process NDJSON and emit a column-oriented object instead of rows
//!   unnest --ndjson events.jsonl --columnar

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::fs::File;
use std::io::{stdin, BufRead, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use unnest::{
    backfill_missing_ids, JsonSource, NdjsonSource, NormalizeConfig, Normalizer, RecordSource,
    TableWriter, TargetColumns,
};

#[derive(Parser, Debug)]
#[command(name = "unnest")]
#[command(about = "Flatten nested JSON records into a single table", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process newline-delimited JSON (one record per line)
    #[arg(long)]
    ndjson: bool,

    /// Comma-separated final columns to keep, e.g. "id,meta_a"
    #[arg(long, short = 'c')]
    columns: Option<String>,

    /// Separator joining parent and child column names (default: "_")
    #[arg(long, value_parser = parse_separator)]
    separator: Option<String>,

    /// Characters in top-level keys rewritten to the separator (default: ".")
    #[arg(long)]
    key_delimiters: Option<String>,

    /// Column holding records that are not objects (default: "value")
    #[arg(long)]
    placeholder: Option<String>,

    /// Stop after this many expansion passes
    #[arg(long)]
    max_depth: Option<usize>,

    /// Drop rows whose cells are all null
    #[arg(long)]
    drop_null_rows: bool,

    /// Comma-separated ids that must each yield a row
    #[arg(long)]
    ids: Option<String>,

    /// Key holding the record id, used with --ids (default: "id")
    #[arg(long, default_value = "id", requires = "ids")]
    id_key: String,

    /// Write a single column-oriented object instead of one row per line
    #[arg(long)]
    columnar: bool,

    /// Log column pruning and expansion steps
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Build config
    let mut config = NormalizeConfig::default();
    if let Some(sep) = args.separator {
        config.separator = sep;
    }
    if let Some(delims) = args.key_delimiters {
        config.key_delimiters = delims.chars().collect();
    }
    if let Some(placeholder) = args.placeholder {
        config.placeholder_column = placeholder;
    }
    config.max_depth = args.max_depth;
    config.drop_null_rows = args.drop_null_rows;

    let targets = args.columns.as_deref().map(TargetColumns::parse_list);

    let mut records = read_records(args.input.as_deref(), args.ndjson)?;
    info!(records = records.len(), "read input");

    if let Some(ids) = args.ids {
        let ids: Vec<&str> = ids.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
        backfill_missing_ids(&mut records, ids, &args.id_key);
    }

    let (table, report) = Normalizer::new(config).normalize(records, targets.as_ref());
    info!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        passes = report.passes,
        "normalized"
    );
    if !report.unmatched_targets.is_empty() {
        warn!(
            "columns not found: {}",
            report.unmatched_targets.join(", ")
        );
    }

    let mut writer = TableWriter::new(std::io::stdout().lock());
    if args.columnar {
        writer.write_columnar(&table)?;
    } else {
        writer.write_rows(&table)?;
    }
    writer.flush()?;

    Ok(())
}

fn parse_separator(raw: &str) -> std::result::Result<String, String> {
    if raw.is_empty() {
        return Err(String::from("separator must not be empty"));
    }
    Ok(raw.to_string())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "unnest=debug" } else { "unnest=warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}

fn read_records(input: Option<&str>, ndjson: bool) -> Result<Vec<Value>> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path))?,
        )),
        None => Box::new(BufReader::new(stdin())),
    };

    let records = if ndjson {
        NdjsonSource::new(reader).records()
    } else {
        JsonSource::new(reader).records()
    };
    records.context("Failed to read records")
}
