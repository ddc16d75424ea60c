use clap::Args;
use serde_json::Value;

use fit_valuation_core::degradation::{self, DegradationInput};
use fit_valuation_core::Technology;

use crate::input;

/// Arguments for the degradation schedule
#[derive(Args)]
pub struct DegradationArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Technology
    #[arg(long, default_value = "photovoltaic")]
    pub technology: Technology,

    /// Completed operating years before the window
    #[arg(long, default_value_t = 0)]
    pub years_elapsed: u32,

    /// Operating years in the window
    #[arg(long, default_value_t = 20)]
    pub window_years: u32,

    /// Report only the average factor
    #[arg(long)]
    pub no_series: bool,
}

pub fn run_degradation(args: DegradationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let degradation_input: DegradationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DegradationInput {
            technology: args.technology,
            years_elapsed: args.years_elapsed,
            window_years: args.window_years,
            include_series: !args.no_series,
        }
    };

    let result = degradation::degradation_schedule(&degradation_input)?;
    Ok(serde_json::to_value(result)?)
}
