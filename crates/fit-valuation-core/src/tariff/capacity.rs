use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::SchemeYear;
use crate::error::ValuationError;
use crate::reference::{CapacityBand, DataQualityWarning, FindingKind, PeriodRates};
use crate::technology::Technology;
use crate::types::{Kilowatts, PencePerKwh};
use crate::FitResult;

/// The band a capacity fell into and its rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandMatch {
    pub band: CapacityBand,
    pub rate_p_per_kwh: PencePerKwh,
    /// Other bands that also matched beyond a shared endpoint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also_matched: Vec<CapacityBand>,
}

impl BandMatch {
    pub fn is_ambiguous(&self) -> bool {
        !self.also_matched.is_empty()
    }
}

/// Reject capacities the matcher cannot meaningfully band.
pub fn validate_capacity(capacity_kw: Kilowatts) -> FitResult<()> {
    if capacity_kw <= Decimal::ZERO {
        return Err(ValuationError::invalid(
            "capacity_kw",
            format!("Capacity must be positive, got {capacity_kw}"),
        ));
    }
    Ok(())
}

/// Find the band for `capacity_kw` in a period's rate card. The first band in
/// capacity order wins; any further match that is not just a shared endpoint
/// is recorded in `also_matched` and reported as an ambiguity finding.
pub fn match_band(
    technology: &Technology,
    rates: &PeriodRates,
    capacity_kw: Kilowatts,
) -> FitResult<BandMatch> {
    validate_capacity(capacity_kw)?;

    let mut matching = rates.bands.iter().filter(|b| b.band.contains(capacity_kw));
    let first = matching.next().ok_or_else(|| {
        ValuationError::unresolved(
            technology,
            format!("no {} capacity band covers {capacity_kw} kW", rates.period),
        )
    })?;

    let also_matched: Vec<CapacityBand> = matching
        .filter(|other| {
            first.band.contains_interior(capacity_kw) || other.band.contains_interior(capacity_kw)
        })
        .map(|other| other.band)
        .collect();

    Ok(BandMatch {
        band: first.band,
        rate_p_per_kwh: first.rate_p_per_kwh,
        also_matched,
    })
}

pub(crate) fn ambiguity_warning(
    technology: &Technology,
    period: SchemeYear,
    found: &BandMatch,
) -> Option<DataQualityWarning> {
    if !found.is_ambiguous() {
        return None;
    }
    let others: Vec<String> = found.also_matched.iter().map(|b| b.to_string()).collect();
    Some(
        DataQualityWarning::new(
            FindingKind::AmbiguousBand,
            Some(technology),
            format!(
                "capacity matches {} and {}; using {}",
                found.band,
                others.join(", "),
                found.band
            ),
        )
        .in_period(period),
    )
}
