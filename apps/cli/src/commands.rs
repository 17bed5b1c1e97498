//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use catscout_core::pipeline::{ProgressReporter, ScrapeRunResult, scrape_catalog};
use catscout_shared::{AppConfig, ScrapeConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// catscout — harvest the assessment product catalog.
#[derive(Parser)]
#[command(
    name = "catscout",
    version,
    about = "Scrape the assessment product catalog and reshape the record set.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl the catalog, enrich every listing, and write the CSV.
    Scrape {
        /// Output CSV path (defaults to the configured path).
        #[arg(short, long)]
        out: Option<String>,

        /// Concurrent detail-fetch workers.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Pause between list-page fetches, in milliseconds.
        #[arg(long)]
        page_delay_ms: Option<u64>,

        /// Alternate config file path.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Reshape a catalog CSV into JSON records.
    ExportJson {
        /// Input CSV path (defaults to the configured scrape output).
        #[arg(short, long)]
        input: Option<String>,

        /// Output JSON path.
        #[arg(short, long, default_value = "shl_data.json")]
        out: String,
    },

    /// Rewrite a catalog CSV with test-type codes expanded to full names.
    MapTestTypes {
        /// Input CSV path (defaults to the configured scrape output).
        #[arg(short, long)]
        input: Option<String>,

        /// Output CSV path.
        #[arg(short, long, default_value = "shl_assessments_mapped.csv")]
        out: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default catscout.toml to the working directory.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "catscout=info",
        1 => "catscout=debug",
        _ => "catscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            out,
            concurrency,
            page_delay_ms,
            config,
        } => cmd_scrape(out.as_deref(), concurrency, page_delay_ms, config.as_deref()).await,
        Command::ExportJson { input, out } => cmd_export_json(input.as_deref(), &out),
        Command::MapTestTypes { input, out } => cmd_map_test_types(input.as_deref(), &out),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_scrape(
    out: Option<&str>,
    concurrency: Option<usize>,
    page_delay_ms: Option<u64>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_app_config(config_path)?;

    let mut scrape_config = ScrapeConfig::from(&config);
    if let Some(concurrency) = concurrency {
        scrape_config.concurrency = concurrency;
    }
    if let Some(delay) = page_delay_ms {
        scrape_config.page_delay_ms = delay;
    }

    let csv_path = PathBuf::from(out.unwrap_or(&config.output.csv_path));

    info!(
        partitions = scrape_config.partitions.len(),
        concurrency = scrape_config.concurrency,
        "starting catalog scrape"
    );

    let reporter = Arc::new(CliProgress::new());
    let result = scrape_catalog(&scrape_config, reporter).await?;

    let written = catscout_export::write_catalog(&csv_path, &result.listings)?;

    println!();
    if written == 0 {
        println!("  No listings collected — nothing written.");
    } else {
        println!("  Catalog scraped successfully!");
        for (label, count) in &result.partition_counts {
            println!("  {label}: {count} listings");
        }
        println!("  Total:  {}", result.listings.len());
        println!("  Output: {}", csv_path.display());
    }
    println!("  Time:   {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_export_json(input: Option<&str>, out: &str) -> Result<()> {
    let config = load_config()?;
    let input = PathBuf::from(input.unwrap_or(&config.output.csv_path));
    let out = PathBuf::from(out);

    let count = catscout_export::export_json(&input, &out)?;
    println!("  Exported {count} records to {}", out.display());
    Ok(())
}

fn cmd_map_test_types(input: Option<&str>, out: &str) -> Result<()> {
    let config = load_config()?;
    let input = PathBuf::from(input.unwrap_or(&config.output.csv_path));
    let out = PathBuf::from(out);

    let count = catscout_export::map_test_types(&input, &out)?;
    println!("  Wrote {count} mapped rows to {}", out.display());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("  Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn partition_scraped(&self, label: &str, count: usize) {
        self.spinner.println(format!("  {label}: {count} listings found"));
    }

    fn enriched(&self, done: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching details [{done}/{total}]"));
    }

    fn done(&self, _result: &ScrapeRunResult) {
        self.spinner.finish_and_clear();
    }
}
