use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::technology::Technology;
use crate::types::{with_metadata, ComputationOutput, Fraction};
use crate::FitResult;

/// Longest window a schedule may be requested for.
const MAX_SCHEDULE_YEARS: u32 = 60;

/// Upper bound on the last operating year a schedule may reach.
const MAX_OPERATING_YEARS: u32 = 100;

/// Photovoltaic output in the first operating year relative to nameplate.
pub const PV_FIRST_YEAR_EFFICIENCY: Fraction = dec!(0.98);

/// Year-on-year retention after the first year (≈0.54% loss per year).
pub const PV_ANNUAL_RETENTION: Fraction = dec!(0.9946);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEfficiency {
    /// Operating year, 1-based from commissioning.
    pub year: u32,
    pub efficiency: Fraction,
}

/// Average output multiplier over a projection window, with the per-year
/// series when requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradationProfile {
    pub technology: Technology,
    /// Completed operating years before the window starts.
    pub years_elapsed: u32,
    /// Number of operating years in the window.
    pub window_years: u32,
    pub average_factor: Fraction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<YearEfficiency>,
}

/// Efficiency in a given operating year (1-based). Non-degrading technologies
/// are 1.0 throughout; year 0 is treated as year 1.
pub fn efficiency_in_year(technology: &Technology, year: u32) -> Fraction {
    if !technology.degrades() {
        return Decimal::ONE;
    }
    let mut eff = PV_FIRST_YEAR_EFFICIENCY;
    for _ in 1..year.max(1) {
        eff *= PV_ANNUAL_RETENTION;
    }
    eff
}

/// Per-year efficiencies for `count` years starting at operating year `first_year`.
pub fn efficiency_series(technology: &Technology, first_year: u32, count: u32) -> Vec<YearEfficiency> {
    let first_year = first_year.max(1);
    let mut eff = efficiency_in_year(technology, first_year);
    let retention = if technology.degrades() {
        PV_ANNUAL_RETENTION
    } else {
        Decimal::ONE
    };

    (0..count)
        .map(|i| {
            if i > 0 {
                eff *= retention;
            }
            YearEfficiency {
                year: first_year.saturating_add(i),
                efficiency: eff,
            }
        })
        .collect()
}

/// Mean efficiency over the `window_years` operating years that follow
/// `years_elapsed` completed years. An empty window yields the efficiency of
/// the current operating year.
pub fn average_factor(technology: &Technology, years_elapsed: u32, window_years: u32) -> Fraction {
    if !technology.degrades() {
        return Decimal::ONE;
    }
    if window_years == 0 {
        return efficiency_in_year(technology, years_elapsed.saturating_add(1));
    }
    let series = efficiency_series(technology, years_elapsed.saturating_add(1), window_years);
    let total: Decimal = series.iter().map(|y| y.efficiency).sum();
    total / Decimal::from(window_years)
}

/// Build a degradation profile, optionally including the per-year series.
pub fn degradation_profile(
    technology: &Technology,
    years_elapsed: u32,
    window_years: u32,
    include_series: bool,
) -> DegradationProfile {
    DegradationProfile {
        technology: technology.clone(),
        years_elapsed,
        window_years,
        average_factor: average_factor(technology, years_elapsed, window_years),
        series: if include_series {
            efficiency_series(technology, years_elapsed.saturating_add(1), window_years)
        } else {
            Vec::new()
        },
    }
}

/// Request for a standalone degradation schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationInput {
    pub technology: Technology,
    #[serde(default)]
    pub years_elapsed: u32,
    pub window_years: u32,
    #[serde(default = "default_true")]
    pub include_series: bool,
}

fn default_true() -> bool {
    true
}

/// Average factor and per-year efficiency schedule for a window, wrapped in
/// the standard output envelope.
pub fn degradation_schedule(input: &DegradationInput) -> FitResult<ComputationOutput<DegradationProfile>> {
    let start = Instant::now();
    if input.window_years > MAX_SCHEDULE_YEARS {
        return Err(ValuationError::invalid(
            "window_years",
            format!("Window cannot exceed {MAX_SCHEDULE_YEARS} years"),
        ));
    }
    if input.years_elapsed.saturating_add(input.window_years) > MAX_OPERATING_YEARS {
        return Err(ValuationError::invalid(
            "years_elapsed",
            format!("Window must end within {MAX_OPERATING_YEARS} operating years"),
        ));
    }

    let mut warnings = Vec::new();
    if !input.technology.degrades() {
        warnings.push(format!(
            "{} has no modelled output degradation; factor is 1.0",
            input.technology
        ));
    }

    let profile = degradation_profile(
        &input.technology,
        input.years_elapsed,
        input.window_years,
        input.include_series,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Photovoltaic efficiency 0.98 in year one, x0.9946 per later year; arithmetic mean over the window",
        input,
        warnings,
        elapsed,
        profile,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_years() {
        let pv = Technology::Photovoltaic;
        assert_eq!(efficiency_in_year(&pv, 1), dec!(0.98));
        assert_eq!(efficiency_in_year(&pv, 2), dec!(0.98) * dec!(0.9946));
        assert_eq!(efficiency_in_year(&pv, 0), dec!(0.98));
    }

    #[test]
    fn test_non_pv_is_flat() {
        for tech in [Technology::Wind, Technology::Hydro, Technology::MicroChp] {
            assert_eq!(average_factor(&tech, 7, 13), Decimal::ONE);
            assert!(efficiency_series(&tech, 1, 20).iter().all(|y| y.efficiency == Decimal::ONE));
        }
    }

    #[test]
    fn test_series_matches_point_lookup() {
        let pv = Technology::Photovoltaic;
        let series = efficiency_series(&pv, 5, 4);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0].year, 5);
        for y in &series {
            assert_eq!(y.efficiency, efficiency_in_year(&pv, y.year));
        }
    }

    #[test]
    fn test_average_sits_inside_window() {
        let pv = Technology::Photovoltaic;
        let avg = average_factor(&pv, 12, 8);
        assert!(avg < efficiency_in_year(&pv, 13));
        assert!(avg > efficiency_in_year(&pv, 20));
    }

    #[test]
    fn test_empty_window_uses_current_year() {
        let pv = Technology::Photovoltaic;
        assert_eq!(average_factor(&pv, 20, 0), efficiency_in_year(&pv, 21));
    }

    #[test]
    fn test_profile_series_optional() {
        let pv = Technology::Photovoltaic;
        assert!(degradation_profile(&pv, 0, 20, false).series.is_empty());
        assert_eq!(degradation_profile(&pv, 0, 20, true).series.len(), 20);
    }

    #[test]
    fn test_schedule_envelope() {
        let input = DegradationInput {
            technology: Technology::Wind,
            years_elapsed: 3,
            window_years: 5,
            include_series: true,
        };
        let out = degradation_schedule(&input).unwrap();
        assert_eq!(out.result.average_factor, Decimal::ONE);
        assert_eq!(out.warnings.len(), 1);

        let too_long = DegradationInput {
            window_years: 500,
            ..input
        };
        assert!(degradation_schedule(&too_long).is_err());
    }

    #[test]
    fn test_schedule_rejects_window_past_operating_life() {
        let input = DegradationInput {
            technology: Technology::Photovoltaic,
            years_elapsed: u32::MAX,
            window_years: 5,
            include_series: true,
        };
        let err = degradation_schedule(&input).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidInput { ref field, .. } if field == "years_elapsed"));

        let late = DegradationInput {
            years_elapsed: 96,
            ..input.clone()
        };
        assert!(degradation_schedule(&late).is_err());

        let last_allowed = DegradationInput {
            years_elapsed: 95,
            ..input
        };
        let out = degradation_schedule(&last_allowed).unwrap();
        assert_eq!(out.result.series.last().map(|y| y.year), Some(100));
    }

    #[test]
    fn test_large_elapsed_does_not_overflow() {
        let wind = Technology::Wind;
        let profile = degradation_profile(&wind, u32::MAX, 3, true);
        assert_eq!(profile.average_factor, Decimal::ONE);
        assert_eq!(profile.series.last().map(|y| y.year), Some(u32::MAX));
    }
}
