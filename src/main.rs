use analytics::{PortfolioReport, COLUMNS};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{load_config, CliOverrides, Config};
use core_types::PairSpec;
use engine::{ReportEngine, ReportRequest};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// The main entry point for the pairlens application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; it may carry PAIRLENS__* overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    config.apply_overrides(&cli.overrides);
    let _guard = configuration::init_tracing(&config.logging)?;
    tracing::debug!(path = %cli.config.display(), "Configuration loaded.");

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            if let Some(addr) = args.addr {
                config.server.bind_addr = addr;
            }
            web_server::run_server(&config).await
        }
        Commands::Report(args) => handle_report(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Long/short pair performance and risk reports.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(flatten)]
    overrides: CliOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the input form and the JSON API.
    Serve(ServeArgs),
    /// Compute a report once, print it and write the HTML export.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind, overriding `server.bind_addr`.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser)]
struct ReportArgs {
    /// A pair as LONG:SHORT (e.g. "AAPL:MSFT"). Repeat for more pairs.
    #[arg(long = "pair", required = true)]
    pairs: Vec<PairSpec>,

    /// The start date (format: YYYY-MM-DD). Defaults to `report.default_start_date`.
    #[arg(long)]
    start: Option<NaiveDate>,
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

async fn handle_report(args: ReportArgs, config: &Config) -> anyhow::Result<()> {
    let engine = ReportEngine::from_config(config)?;
    let request = ReportRequest {
        pairs: args.pairs,
        start_date: args.start.unwrap_or(config.report.default_start_date),
        as_of: Utc::now().date_naive(),
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Fetching prices for {} pair(s)...", request.pairs.len()));

    let result = engine.run(&request).await;
    spinner.finish_and_clear();
    let report = result?;

    println!("{}", render_table(&report));
    println!("Calculated Risk-Free Rate: {:.2}%", report.risk_free_rate_pct);

    let path = &config.report.output_path;
    web_server::export::write_report(path, &report)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Results saved to {}", path.display());

    Ok(())
}

fn render_table(report: &PortfolioReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(COLUMNS);
    for row in report.all_rows() {
        table.add_row(row.cells());
    }
    table
}
