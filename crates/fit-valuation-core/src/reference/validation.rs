use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::band::CapacityBand;
use super::tariff::{PeriodRates, TariffSchedule, TariffTable};
use crate::dates::SchemeYear;
use crate::technology::Technology;

/// Category of a non-fatal data-quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Capacities between two bands are covered by neither.
    BandGap,
    /// Two bands share more than a boundary point.
    BandOverlap,
    /// The highest band is closed, so larger capacities have no rate.
    UncoveredAbove,
    /// A technology's scheme years skip one or more years.
    MissingPeriod,
    /// More than one band matched a capacity at valuation time.
    AmbiguousBand,
    /// The commissioning year had no rate card and an earlier one was used.
    PeriodFallback,
    /// The postcode did not map to a region and the default was used.
    RegionDefaulted,
    /// No regional or all-regions yield entry; a national default was used.
    YieldDefaulted,
}

/// A non-fatal data-quality finding. Logged and surfaced in output warnings,
/// never raised as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityWarning {
    pub kind: FindingKind,
    pub technology: Option<Technology>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<SchemeYear>,
    pub detail: String,
}

impl DataQualityWarning {
    pub fn new(kind: FindingKind, technology: Option<&Technology>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            technology: technology.cloned(),
            period: None,
            detail: detail.into(),
        }
    }

    pub fn in_period(mut self, period: SchemeYear) -> Self {
        self.period = Some(period);
        self
    }

    /// Emit the finding through `tracing`.
    pub fn log(&self) {
        tracing::warn!(
            kind = ?self.kind,
            technology = self.technology.as_ref().map(|t| t.key()).unwrap_or("-"),
            period = %self.period.map(|p| p.to_string()).unwrap_or_default(),
            "data quality: {}",
            self.detail
        );
    }
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.technology, self.period) {
            (Some(t), Some(p)) => write!(f, "{t} {p}: {}", self.detail),
            (Some(t), None) => write!(f, "{t}: {}", self.detail),
            _ => f.write_str(&self.detail),
        }
    }
}

// ---------------------------------------------------------------------------
// Tariff table checks
// ---------------------------------------------------------------------------

/// Check every technology/period rate card for gaps, overlaps and uncovered
/// capacity, plus holes in each technology's run of scheme years.
pub fn validate_tariffs(table: &TariffTable) -> Vec<DataQualityWarning> {
    let mut findings = Vec::new();
    for schedule in table.schedules() {
        findings.extend(check_period_run(schedule));
        for rates in schedule.periods.values() {
            findings.extend(check_band_partition(&schedule.technology, rates));
        }
    }
    findings
}

fn check_period_run(schedule: &TariffSchedule) -> Vec<DataQualityWarning> {
    let periods: Vec<SchemeYear> = schedule.periods.keys().copied().collect();
    periods
        .windows(2)
        .filter(|w| w[1].years_since(w[0]) > 1)
        .map(|w| {
            DataQualityWarning::new(
                FindingKind::MissingPeriod,
                Some(&schedule.technology),
                format!(
                    "no rate card between {} and {}; commissions in between fall back to {}",
                    w[0], w[1], w[0]
                ),
            )
        })
        .collect()
}

/// Walk the bands in capacity order tracking how far the domain is covered.
/// Bands touching at a single shared endpoint are fine: the lower band wins
/// that point because matching is first-match in this order.
pub fn check_band_partition(technology: &Technology, rates: &PeriodRates) -> Vec<DataQualityWarning> {
    let mut findings = Vec::new();
    let finding = |kind, detail: String| {
        DataQualityWarning::new(kind, Some(technology), detail).in_period(rates.period)
    };

    // `None` once a band open above has been seen.
    let mut reach: Option<Decimal> = Some(Decimal::ZERO);
    let mut previous: Option<CapacityBand> = None;

    for band_rate in &rates.bands {
        let band = band_rate.band;
        let Some(covered) = reach else {
            findings.push(finding(
                FindingKind::BandOverlap,
                format!(
                    "band {band} overlaps open-ended band {}",
                    previous.map(|p| p.to_string()).unwrap_or_default()
                ),
            ));
            continue;
        };

        let lower = band.lower();
        if lower > covered {
            findings.push(finding(
                FindingKind::BandGap,
                format!("capacities in ({covered}, {lower}) kW match no band"),
            ));
        } else if lower < covered {
            findings.push(finding(
                FindingKind::BandOverlap,
                format!(
                    "band {band} overlaps {} below {covered} kW",
                    previous.map(|p| p.to_string()).unwrap_or_default()
                ),
            ));
        }

        reach = match band.upper() {
            Some(upper) => Some(upper.max(covered)),
            None => None,
        };
        previous = Some(band);
    }

    if let Some(covered) = reach {
        findings.push(finding(
            FindingKind::UncoveredAbove,
            format!("capacities above {covered} kW match no band"),
        ));
    }

    findings
}
