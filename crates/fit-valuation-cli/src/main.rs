mod commands;
mod context;
mod input;
mod output;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::batch::BatchArgs;
use commands::degradation::DegradationArgs;
use commands::period::ResolvePeriodArgs;
use commands::tables::TablesCommand;
use commands::value::ValueArgs;

/// Feed-in Tariff installation valuation
#[derive(Parser)]
#[command(
    name = "fitv",
    version,
    about = "Feed-in Tariff installation valuation",
    long_about = "Resolves the historical FIT rate for an installation, estimates its \
                  regional yield, and projects remaining subsidy income with decimal \
                  precision. Works on single records or JSON/CSV batches."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, default_value = "json", global = true)]
    pub output: OutputFormat,

    /// Engine settings file (JSON, or YAML by .yaml/.yml extension)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Tariff table JSON (requires --yields)
    #[arg(long, global = true, requires = "yields")]
    pub tariffs: Option<String>,

    /// Regional yield table JSON (requires --tariffs)
    #[arg(long, global = true, requires = "tariffs")]
    pub yields: Option<String>,

    /// Valuation date, YYYY-MM-DD (defaults to today)
    #[arg(long, global = true)]
    pub as_of: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a single installation
    Value(ValueArgs),
    /// Value a batch of installations from a JSON array or CSV file
    Batch(BatchArgs),
    /// Photovoltaic degradation schedule for a window of operating years
    Degradation(DegradationArgs),
    /// Show which scheme year's rate card applies to a commissioning date
    ResolvePeriod(ResolvePeriodArgs),
    /// Inspect the reference tables
    #[command(subcommand)]
    Tables(TablesCommand),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let global = &cli.global;
    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Value(args) => commands::value::run_value(args, global),
        Commands::Batch(args) => commands::batch::run_batch(args, global),
        Commands::Degradation(args) => commands::degradation::run_degradation(args),
        Commands::ResolvePeriod(args) => commands::period::run_resolve_period(args, global),
        Commands::Tables(cmd) => commands::tables::run_tables(cmd, global),
        Commands::Version => {
            println!("fitv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&global.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
