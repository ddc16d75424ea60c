use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::SchemeYear;
use crate::error::ValuationError;
use crate::reference::{DataQualityWarning, FindingKind, TariffTable};
use crate::technology::Technology;
use crate::FitResult;

/// Why the resolved period differs from the commissioning scheme year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodFallback {
    /// Commissioned after the last rate card; the latest one applies.
    BeyondTable,
    /// A hole in the table; the nearest earlier rate card applies.
    NearestEarlier,
}

/// Outcome of mapping a commissioning date onto a technology's rate cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodResolution {
    /// Scheme year the commissioning date falls in.
    pub target: SchemeYear,
    /// Scheme year whose rate card applies. Always present in the table.
    pub resolved: SchemeYear,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<PeriodFallback>,
}

impl PeriodResolution {
    pub fn lookback_years(&self) -> i32 {
        self.target.years_since(self.resolved)
    }

    pub fn warning(&self, technology: &Technology) -> Option<DataQualityWarning> {
        let detail = match self.fallback? {
            PeriodFallback::BeyondTable => format!(
                "commissioned in {} after the last rate card; using {}",
                self.target, self.resolved
            ),
            PeriodFallback::NearestEarlier => format!(
                "no rate card for {}; using nearest earlier {}",
                self.target, self.resolved
            ),
        };
        Some(DataQualityWarning::new(FindingKind::PeriodFallback, Some(technology), detail))
    }
}

/// Resolve the scheme year whose rates apply to an installation.
///
/// Fails with `UnresolvedRate` when the date is missing, the technology has
/// no rate cards, the date predates the first rate card, or the fallback
/// would reach further back than `max_lookback_years`.
pub fn resolve_period(
    tariffs: &TariffTable,
    technology: &Technology,
    commission_date: Option<NaiveDate>,
    max_lookback_years: Option<u32>,
) -> FitResult<PeriodResolution> {
    let date = commission_date
        .ok_or_else(|| ValuationError::unresolved(technology, "no commissioning date"))?;
    let schedule = tariffs
        .schedule(technology)
        .ok_or_else(|| ValuationError::unresolved(technology, "technology has no tariff table"))?;

    let target = SchemeYear::containing(date);
    if schedule.period(target).is_some() {
        return Ok(PeriodResolution {
            target,
            resolved: target,
            fallback: None,
        });
    }

    let (resolved, _) = schedule.periods.range(..target).next_back().ok_or_else(|| {
        let first = schedule
            .first_period()
            .map(|p| p.to_string())
            .unwrap_or_default();
        ValuationError::unresolved(
            technology,
            format!("commissioned in {target}, before the first rate card ({first})"),
        )
    })?;
    let resolved = *resolved;

    let fallback = if Some(target) > schedule.last_period() {
        PeriodFallback::BeyondTable
    } else {
        PeriodFallback::NearestEarlier
    };

    let resolution = PeriodResolution {
        target,
        resolved,
        fallback: Some(fallback),
    };

    if let Some(limit) = max_lookback_years {
        if resolution.lookback_years() > limit as i32 {
            return Err(ValuationError::unresolved(
                technology,
                format!(
                    "nearest rate card {resolved} is {} scheme years before {target} (limit {limit})",
                    resolution.lookback_years()
                ),
            ));
        }
    }

    tracing::debug!(%technology, %target, %resolved, ?fallback, "scheme year fallback");
    Ok(resolution)
}
