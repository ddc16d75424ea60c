use chrono::{Local, NaiveDate};
use std::path::Path;
use tracing::debug;

use fit_valuation_core::{ReferenceTables, ValuationConfig, ValuationEngine};

use crate::input;
use crate::GlobalOpts;

/// Build the engine once from the global flags: embedded tables unless both
/// table files are given, default settings unless a config file is given.
pub fn build_engine(global: &GlobalOpts) -> Result<ValuationEngine, Box<dyn std::error::Error>> {
    let config: ValuationConfig = match global.config {
        Some(ref path) => input::file::read_config(path)?,
        None => ValuationConfig::default(),
    };

    let tables = match (&global.tariffs, &global.yields) {
        (Some(t), Some(y)) => {
            debug!(tariffs = %t, yields = %y, "loading reference tables from files");
            ReferenceTables::from_files(Path::new(t), Path::new(y))?
        }
        _ => ReferenceTables::embedded()?,
    };

    Ok(ValuationEngine::new(tables, config)?)
}

pub fn as_of(global: &GlobalOpts) -> NaiveDate {
    global.as_of.unwrap_or_else(|| Local::now().date_naive())
}
