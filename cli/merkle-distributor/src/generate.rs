use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::info;

use merkle_distributor::{
    hex_encode, parse_balance_map, write_file_atomic, Distribution, IndexOrder,
};

#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(about = "Build the Merkle distribution from an address -> amount map", long_about = None)]
pub struct Cli {
    /// Input JSON object mapping addresses to amounts (numbers or numeric strings)
    #[arg(short, long, env = "INPUT_FILE")]
    input: PathBuf,

    /// Output file for the distribution (default: <input stem>.merkle.json next to the input)
    #[arg(short, long, env = "OUTPUT_FILE")]
    output: Option<PathBuf>,

    /// Rule for assigning leaf indices
    #[arg(long, value_enum, env = "INDEX_ORDER", default_value_t = IndexOrder::Sorted)]
    index_order: IndexOrder,
}

/// `balances.json` -> `balances.merkle.json` in the same directory.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "distribution".to_string());
    input.with_file_name(format!("{stem}.merkle.json"))
}

/// Parses the balance map document and builds the distribution.
pub fn generate(balances_json: &str, order: IndexOrder) -> Result<Distribution> {
    let json: Value = serde_json::from_str(balances_json).context("Failed to parse input JSON")?;
    let Value::Object(balances) = json else {
        anyhow::bail!("Invalid JSON format: expected an object mapping addresses to amounts");
    };
    let distribution =
        parse_balance_map(&balances, order).context("Failed to generate distribution")?;
    Ok(distribution)
}

pub fn run(args: Cli) -> Result<()> {
    info!(input = %args.input.display(), "reading balance map");
    let content = fs::read_to_string(&args.input).context("Failed to read input file")?;

    let distribution = generate(&content, args.index_order)?;

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    let json_output =
        serde_json::to_string_pretty(&distribution).context("Failed to serialize distribution")?;
    write_file_atomic(&output, &json_output).context("Failed to write distribution file")?;

    println!("Merkle root: {}", hex_encode(distribution.merkle_root));
    println!("Token total: {}", distribution.token_total);
    println!("Recipients: {}", distribution.len());
    println!("Distribution written to {}", output.display());

    Ok(())
}
