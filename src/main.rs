//! ztf - run test scripts and keep them in sync with a ZenTao server
//!
//! Scripts are selected from a remote suite or task, a local suite file, a
//! previous report or plain paths, then executed with the interpreter
//! configured for their language.

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use ztf::common::logging;
use ztf::{cli, commands};

#[derive(Parser)]
#[command(name = "ztf", about = "Test script runner for ZenTao")]
#[command(version, long_about = None)]
struct Cli {
    /// Config file (default: the platform config dir's ztf/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log remote requests and echo script output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose);

    let result = match cli::Context::load(cli.config.as_deref(), cli.verbose) {
        Ok(ctx) => cli::dispatch(cli.command, &ctx).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
