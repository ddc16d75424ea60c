use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::repowering::{classify, RepoweringWindow};
use crate::dates::{add_years, years_between};
use crate::error::ValuationError;
use crate::reference::YieldFactor;
use crate::types::{Bounds, Fraction, KilowattHours, Kilowatts, Money, PencePerKwh, Years};
use crate::FitResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Everything the projector needs, already resolved by the upstream models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub capacity_kw: Kilowatts,
    /// Applicable rate in pence per kWh. `None` when the rate is unresolved.
    pub rate_p_per_kwh: Option<PencePerKwh>,
    pub yield_factor: YieldFactor,
    /// Measured annual generation. Wins over the estimate when non-zero.
    pub measured_generation_kwh: Option<KilowattHours>,
    /// Average degradation multiplier over the remaining term.
    pub degradation_factor: Fraction,
    pub contract_years_remaining: Years,
    pub hours_per_year: u32,
    pub planning_horizon_years: u32,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    /// capacity × hours × capacity factor
    Estimated,
    /// Supplied by the caller.
    Measured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueProjection {
    pub annual_generation_kwh: KilowattHours,
    pub generation_source: GenerationSource,
    /// Pounds per year at the current rate. Zero when the rate is zero or
    /// unresolved.
    pub annual_income: Money,
    pub degradation_factor: Fraction,
    pub total_remaining_value: Money,
    pub confidence_range: Bounds,
    pub contract_years_remaining: Years,
    pub repowering_window: RepoweringWindow,
}

// ---------------------------------------------------------------------------
// Contract term
// ---------------------------------------------------------------------------

/// End of the subsidy contract: the explicit expiry when given, otherwise
/// commissioning plus the standard term. `None` when neither date is known.
pub fn contract_expiry(
    commission_date: Option<NaiveDate>,
    explicit_expiry: Option<NaiveDate>,
    term_years: u32,
) -> FitResult<Option<NaiveDate>> {
    match (explicit_expiry, commission_date) {
        (Some(expiry), _) => Ok(Some(expiry)),
        (None, Some(commissioned)) => add_years(commissioned, term_years).map(Some),
        (None, None) => Ok(None),
    }
}

/// Years left on the contract at `today`, to one decimal place, floored at 0.
/// An unknown expiry counts as no remaining term.
pub fn contract_years_remaining(expiry: Option<NaiveDate>, today: NaiveDate) -> Years {
    expiry
        .map(|e| years_between(today, e).max(Decimal::ZERO))
        .unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Combine rate, yield, degradation and remaining term into income figures.
pub fn project_revenue(input: &ProjectionInput) -> FitResult<RevenueProjection> {
    validate_projection_input(input)?;

    let hours = Decimal::from(input.hours_per_year);
    let years = input.contract_years_remaining.max(Decimal::ZERO);
    let rate = input.rate_p_per_kwh.unwrap_or(Decimal::ZERO);

    let measured = input
        .measured_generation_kwh
        .filter(|g| !g.is_zero());
    let (annual_generation_kwh, generation_source) = match measured {
        Some(g) => (g, GenerationSource::Measured),
        None => (
            input.capacity_kw * hours * input.yield_factor.capacity_factor,
            GenerationSource::Estimated,
        ),
    };

    let income = |generation: KilowattHours| generation * rate / Decimal::ONE_HUNDRED;
    let lifetime = |generation: KilowattHours| {
        if years <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            income(generation) * years * input.degradation_factor
        }
    };

    let annual_income = income(annual_generation_kwh);
    let total_remaining_value = lifetime(annual_generation_kwh);

    // A measured figure has no yield uncertainty left to express.
    let confidence_range = match generation_source {
        GenerationSource::Measured => Bounds::point(total_remaining_value),
        GenerationSource::Estimated => input
            .yield_factor
            .range
            .map(|cf| lifetime(input.capacity_kw * hours * cf)),
    };

    Ok(RevenueProjection {
        annual_generation_kwh,
        generation_source,
        annual_income: annual_income.round_dp(2),
        degradation_factor: input.degradation_factor.round_dp(6),
        total_remaining_value: total_remaining_value.round_dp(2),
        confidence_range: confidence_range.map(|v| v.round_dp(2)),
        contract_years_remaining: years,
        repowering_window: classify(years, input.planning_horizon_years),
    })
}

fn validate_projection_input(input: &ProjectionInput) -> FitResult<()> {
    if input.capacity_kw <= Decimal::ZERO {
        return Err(ValuationError::invalid(
            "capacity_kw",
            format!("Capacity must be positive, got {}", input.capacity_kw),
        ));
    }
    if let Some(rate) = input.rate_p_per_kwh {
        if rate < Decimal::ZERO {
            return Err(ValuationError::invalid(
                "tariff_rate_p_per_kwh",
                format!("Rate cannot be negative, got {rate}"),
            ));
        }
    }
    if let Some(g) = input.measured_generation_kwh {
        if g < Decimal::ZERO {
            return Err(ValuationError::invalid(
                "annual_generation_kwh",
                format!("Generation cannot be negative, got {g}"),
            ));
        }
    }
    if input.degradation_factor <= Decimal::ZERO || input.degradation_factor > Decimal::ONE {
        return Err(ValuationError::invalid(
            "degradation_factor",
            "Degradation factor must be in (0, 1]",
        ));
    }
    Ok(())
}
