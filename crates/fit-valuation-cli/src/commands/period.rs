use clap::Args;
use serde_json::Value;

use fit_valuation_core::Technology;

use crate::context;
use crate::GlobalOpts;

/// Arguments for the scheme-year probe
#[derive(Args)]
pub struct ResolvePeriodArgs {
    /// Technology
    #[arg(long)]
    pub technology: Technology,

    /// Commissioning date
    #[arg(long)]
    pub commission_date: Option<String>,
}

pub fn run_resolve_period(
    args: ResolvePeriodArgs,
    global: &GlobalOpts,
) -> Result<Value, Box<dyn std::error::Error>> {
    let engine = context::build_engine(global)?;
    let result = engine.probe_period(&args.technology, args.commission_date.as_deref())?;
    Ok(serde_json::to_value(result)?)
}
