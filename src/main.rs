use std::process::ExitCode;

use clap::Parser;
use teller::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.execute().await
}
