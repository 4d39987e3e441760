#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use clap::{ArgAction, Parser, Subcommand};

use merkle_distributor::logging::{self, LogLevel};

mod check;
mod claim;
mod generate;

#[derive(Parser, Debug)]
#[command(name = "merkle-distributor")]
#[command(about = "Merkle airdrop distribution tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease log verbosity (-q warnings only, -qq errors only)
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "verbose")]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Generate(generate::Cli),
    Claim(claim::Cli),
    Verify(check::Cli),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::try_init(LogLevel::from_verbosity(cli.verbose, cli.quiet))
        .map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Generate(args) => generate::run(args)?,
        Commands::Claim(args) => claim::run(args)?,
        Commands::Verify(args) => check::run(&args)?,
    }

    Ok(())
}
