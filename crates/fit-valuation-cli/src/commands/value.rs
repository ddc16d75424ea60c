use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fit_valuation_core::{InstallationRecord, Technology};

use crate::context;
use crate::input;
use crate::GlobalOpts;

/// Arguments for single-installation valuation
#[derive(Args)]
pub struct ValueArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Caller's identifier for the installation
    #[arg(long)]
    pub id: Option<String>,

    /// Technology (wind, photovoltaic, hydro, anaerobic_digestion, micro_chp)
    #[arg(long)]
    pub technology: Option<Technology>,

    /// Installed capacity in kW
    #[arg(long, alias = "kw")]
    pub capacity_kw: Option<Decimal>,

    /// Postcode of the site
    #[arg(long, default_value = "")]
    pub postcode: String,

    /// Commissioning date
    #[arg(long)]
    pub commission_date: Option<String>,

    /// Explicit contract end date
    #[arg(long)]
    pub contract_expiry: Option<String>,

    /// Installation sub-type, e.g. ground_mounted or domestic
    #[arg(long)]
    pub installation_type: Option<String>,

    /// Known tariff rate in p/kWh (overrides the table)
    #[arg(long, alias = "rate")]
    pub tariff_rate: Option<Decimal>,

    /// Measured annual generation in kWh (overrides the estimate)
    #[arg(long)]
    pub annual_generation: Option<Decimal>,
}

pub fn run_value(args: ValueArgs, global: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let record: InstallationRecord = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        InstallationRecord {
            id: args.id,
            technology: args
                .technology
                .ok_or("--technology is required (or provide --input)")?,
            capacity_kw: args
                .capacity_kw
                .ok_or("--capacity-kw is required (or provide --input)")?,
            postcode: args.postcode,
            commission_date: args.commission_date,
            contract_expiry: args.contract_expiry,
            installation_type: args.installation_type,
            tariff_rate_p_per_kwh: args.tariff_rate,
            annual_generation_kwh: args.annual_generation,
        }
    };

    let engine = context::build_engine(global)?;
    let result = engine.value(&record, context::as_of(global))?;
    Ok(serde_json::to_value(result)?)
}
