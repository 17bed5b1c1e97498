//! catscout CLI — assessment-catalog scraper and record-set toolbox.
//!
//! Crawls the paginated product catalog, enriches each listing from its
//! detail page, and writes the merged record set as CSV, with companion
//! commands for reshaping the persisted records.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
