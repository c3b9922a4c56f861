//! Discount Arbiter CLI

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), cli::CliError> {
    cli::Cli::parse().run().await
}
