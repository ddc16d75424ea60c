pub mod capacity;
pub mod period;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use capacity::{match_band, validate_capacity, BandMatch};
pub use period::{resolve_period, PeriodFallback, PeriodResolution};

use crate::error::ValuationError;
use crate::reference::{DataQualityWarning, TariffTable};
use crate::technology::Technology;
use crate::types::Kilowatts;
use crate::FitResult;

/// A fully resolved tariff: the scheme year and the band within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffResolution {
    pub period: PeriodResolution,
    pub band: BandMatch,
}

impl TariffResolution {
    pub fn warnings(&self, technology: &Technology) -> Vec<DataQualityWarning> {
        self.period
            .warning(technology)
            .into_iter()
            .chain(capacity::ambiguity_warning(technology, self.period.resolved, &self.band))
            .collect()
    }
}

/// Period resolution followed by band matching.
pub fn resolve_tariff(
    tariffs: &TariffTable,
    technology: &Technology,
    commission_date: Option<NaiveDate>,
    capacity_kw: Kilowatts,
    max_lookback_years: Option<u32>,
) -> FitResult<TariffResolution> {
    validate_capacity(capacity_kw)?;
    let period = resolve_period(tariffs, technology, commission_date, max_lookback_years)?;
    let rates = tariffs
        .schedule(technology)
        .and_then(|s| s.period(period.resolved))
        .ok_or_else(|| {
            ValuationError::unresolved(technology, format!("rate card {} vanished", period.resolved))
        })?;
    let band = match_band(technology, rates, capacity_kw)?;
    Ok(TariffResolution { period, band })
}
