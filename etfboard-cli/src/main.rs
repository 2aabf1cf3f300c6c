//! etfboard CLI: pick a date range and tickers, print prices.
//!
//! Commands:
//! - `show`: run one dashboard interaction and print the table, CSV or JSON
//! - `export`: write the long-form chart records to a CSV file
//! - `catalog`: list the tickers the dashboard knows about

mod output;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use etfboard_core::config::ProviderKind;
use etfboard_core::{Dashboard, DashboardConfig, DashboardView, ViewRequest};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "etfboard", about = "ETF closing-price dashboard")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices for a range and print the selected tickers.
    Show {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        request: RequestArgs,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Write the long-form records (Date,Name,Stock Price(USD)) to a CSV file.
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        request: RequestArgs,

        /// Destination file.
        #[arg(long)]
        out: PathBuf,
    },
    /// List catalog keys and symbols in catalog order.
    Catalog {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Path to a TOML config file. Defaults to <config dir>/etfboard/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read prices from <DIR>/<SYMBOL>.csv instead of the configured provider.
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

#[derive(Args)]
struct RequestArgs {
    /// Start date (YYYY-MM-DD). Defaults to the configured minimum date.
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    /// Comma-separated tickers to show. Defaults to the configured selection.
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Show {
            source,
            request,
            format,
        } => run_show(&source, &request, format),
        Commands::Export {
            source,
            request,
            out,
        } => run_export(&source, &request, &out),
        Commands::Catalog { source } => run_catalog(&source),
    }
}

fn run_show(source: &SourceArgs, request: &RequestArgs, format: OutputFormat) -> Result<()> {
    let view = render(source, request)?;
    let text = match format {
        OutputFormat::Table => output::render_table(&view.display_table()),
        OutputFormat::Csv => output::records_to_csv(&view.records)?,
        OutputFormat::Json => output::view_to_json(&view)? + "\n",
    };
    print!("{text}");
    Ok(())
}

fn run_export(source: &SourceArgs, request: &RequestArgs, out: &Path) -> Result<()> {
    let view = render(source, request)?;
    output::export_records(&view.records, out)?;
    println!("Wrote {} records to {}", view.records.len(), out.display());
    Ok(())
}

fn run_catalog(source: &SourceArgs) -> Result<()> {
    let config = load_config(source)?;
    for entry in config.catalog().iter() {
        println!("{:<6} {}", entry.key, entry.symbol);
    }
    Ok(())
}

/// Build the dashboard and run one interaction for the given flags.
fn render(source: &SourceArgs, args: &RequestArgs) -> Result<DashboardView> {
    let config = load_config(source)?;
    let dashboard = Dashboard::from_config(config)?;
    let today = chrono::Local::now().date_naive();

    let request = build_request(dashboard.default_request(today), args);
    info!(
        start = %request.start,
        end = %request.end,
        selection = ?request.selection,
        provider = dashboard.aggregator().provider_name(),
        "rendering dashboard"
    );
    Ok(dashboard.render(&request, today)?)
}

/// Flags override the default request field by field.
fn build_request(mut request: ViewRequest, args: &RequestArgs) -> ViewRequest {
    if let Some(start) = args.start {
        request.start = start;
    }
    if let Some(end) = args.end {
        request.end = end;
    }
    if !args.select.is_empty() {
        request.selection = args
            .select
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    request
}

fn load_config(source: &SourceArgs) -> Result<DashboardConfig> {
    let mut config = match config_path(source.config.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            DashboardConfig::from_file(&path)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => DashboardConfig::default(),
    };

    if let Some(dir) = &source.csv_dir {
        config.provider.kind = ProviderKind::Csv;
        config.provider.csv_dir = Some(dir.clone());
    }
    Ok(config)
}

/// An explicit path always wins; the platform default is used only if present.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    dirs::config_dir()
        .map(|dir| dir.join("etfboard").join("config.toml"))
        .filter(|path| path.exists())
}
