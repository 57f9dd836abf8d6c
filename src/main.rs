//! API automation harness CLI
//!
//! Drives an orchestration platform's REST API test scripts in a fixed
//! order and reports the results as HTML.

use api_harness::cli;
use api_harness::commands::{Commands, GlobalOptions};
use clap::Parser;

#[derive(Parser)]
#[command(name = "api-harness", about = "REST API integration test automation")]
#[command(version, long_about = None)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli::dispatch(cli.command, &cli.options).await {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
