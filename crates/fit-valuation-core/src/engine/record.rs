use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::SchemeYear;
use crate::reference::CapacityBand;
use crate::region::Region;
use crate::revenue::{GenerationSource, RepoweringWindow};
use crate::technology::Technology;
use crate::types::{Bounds, Fraction, KilowattHours, Kilowatts, Money, PencePerKwh, Years};
use crate::yield_model::YieldSource;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// An installation as held by the caller's store. Dates are free text and
/// are parsed during valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationRecord {
    /// Opaque identifier from the caller's store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub technology: Technology,
    pub capacity_kw: Kilowatts,
    #[serde(default)]
    pub postcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_date: Option<String>,
    /// Explicit contract end date; overrides commissioning + term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_expiry: Option<String>,
    /// Sub-type such as `ground_mounted` or `domestic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_type: Option<String>,
    /// Known tariff rate; used instead of the table when non-zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tariff_rate_p_per_kwh: Option<PencePerKwh>,
    /// Measured annual generation; used instead of the estimate when non-zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_generation_kwh: Option<KilowattHours>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Where the rate used in the valuation came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateSource {
    /// Resolved from the tariff table.
    Tariff,
    /// Supplied on the record.
    Supplied,
    /// No rate could be determined. Income is reported as zero but is unknown.
    Unresolved { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub technology: Technology,
    pub capacity_kw: Kilowatts,

    pub fit_rate_p_per_kwh: Option<PencePerKwh>,
    pub resolved_period: Option<SchemeYear>,
    pub capacity_band: Option<CapacityBand>,
    pub rate_source: RateSource,

    pub region: Region,
    pub region_defaulted: bool,
    pub capacity_factor: Fraction,
    pub yield_source: YieldSource,

    pub annual_generation_kwh: KilowattHours,
    pub generation_source: GenerationSource,
    pub annual_income: Money,
    pub degradation_factor: Fraction,
    pub total_remaining_value: Money,
    pub confidence_range: Bounds,

    pub contract_expiry: Option<NaiveDate>,
    pub contract_years_remaining: Years,
    pub repowering_window: RepoweringWindow,
}

/// The fields a caller writes back into its installation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub fit_rate_p_per_kwh: Option<PencePerKwh>,
    pub tariff_period: Option<String>,
    pub capacity_band: Option<String>,
    pub region: String,
    pub capacity_factor: Fraction,
    pub annual_income: Money,
    pub total_remaining_value: Money,
    pub repowering_window: RepoweringWindow,
}

impl ValuationResult {
    pub fn is_rate_resolved(&self) -> bool {
        !matches!(self.rate_source, RateSource::Unresolved { .. })
    }

    pub fn enrichment(&self) -> Enrichment {
        Enrichment {
            fit_rate_p_per_kwh: self.fit_rate_p_per_kwh,
            tariff_period: self.resolved_period.map(|p| p.to_string()),
            capacity_band: self.capacity_band.map(|b| b.to_string()),
            region: self.region.key().to_string(),
            capacity_factor: self.capacity_factor,
            annual_income: self.annual_income,
            total_remaining_value: self.total_remaining_value,
            repowering_window: self.repowering_window,
        }
    }

    /// One-line description for downstream text. Unresolved rates are never
    /// rendered as a number.
    pub fn summary_line(&self) -> String {
        let name = self.id.as_deref().unwrap_or("installation");
        let head = format!(
            "{name}: {} {} kW in {}",
            self.technology.display_name(),
            self.capacity_kw.normalize(),
            self.region.display_name()
        );
        match (&self.rate_source, self.fit_rate_p_per_kwh) {
            (RateSource::Unresolved { .. }, _) | (_, None) => {
                format!("{head}, rate/period unknown")
            }
            (_, Some(rate)) => {
                let period = self
                    .resolved_period
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "supplied rate".to_string());
                format!(
                    "{head}, {}p/kWh ({period}), £{}/yr, £{} remaining over {} yrs [{}]",
                    rate.normalize(),
                    self.annual_income,
                    self.total_remaining_value,
                    self.contract_years_remaining,
                    self.repowering_window
                )
            }
        }
    }
}
