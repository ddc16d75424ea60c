use serde::{Deserialize, Serialize};

use crate::error::ValuationError;
use crate::region::Region;
use crate::FitResult;

/// Ceiling for any term or horizon expressed in years.
pub const MAX_TERM_YEARS: u32 = 100;

/// Engine-wide settings. Built once and shared immutably with every valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Contract length from commissioning when a record has no explicit expiry.
    pub contract_term_years: u32,
    /// Remaining years above which an asset is classed `Future` rather than
    /// `Planning`.
    pub planning_horizon_years: u32,
    /// Region used when a postcode cannot be mapped.
    pub default_region: Region,
    /// When set, falling back more than this many scheme years to find a rate
    /// card leaves the rate unresolved instead of using a stale rate.
    pub max_lookback_years: Option<u32>,
    /// Hours in a generation year.
    pub hours_per_year: u32,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            contract_term_years: 20,
            planning_horizon_years: 15,
            default_region: Region::default(),
            max_lookback_years: None,
            hours_per_year: 8760,
        }
    }
}

impl ValuationConfig {
    pub fn validate(&self) -> FitResult<()> {
        if self.contract_term_years == 0 || self.contract_term_years > MAX_TERM_YEARS {
            return Err(ValuationError::invalid(
                "contract_term_years",
                format!("Contract term must be between 1 and {MAX_TERM_YEARS} years"),
            ));
        }
        if self.planning_horizon_years <= 10 || self.planning_horizon_years > MAX_TERM_YEARS {
            return Err(ValuationError::invalid(
                "planning_horizon_years",
                format!("Planning horizon must exceed the 10-year Optimal window and be at most {MAX_TERM_YEARS} years"),
            ));
        }
        if self.hours_per_year == 0 || self.hours_per_year > 8784 {
            return Err(ValuationError::invalid(
                "hours_per_year",
                "Hours per year must be between 1 and 8784",
            ));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> FitResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ValuationConfig::default();
        assert_eq!(c.contract_term_years, 20);
        assert_eq!(c.planning_horizon_years, 15);
        assert_eq!(c.hours_per_year, 8760);
        assert!(c.max_lookback_years.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c = ValuationConfig::from_json(r#"{"default_region": "wales", "max_lookback_years": 2}"#).unwrap();
        assert_eq!(c.default_region, Region::Wales);
        assert_eq!(c.max_lookback_years, Some(2));
        assert_eq!(c.contract_term_years, 20);
    }

    #[test]
    fn test_horizon_must_exceed_optimal_window() {
        let err = ValuationConfig::from_json(r#"{"planning_horizon_years": 8}"#).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidInput { .. }));
    }

    #[test]
    fn test_terms_are_capped() {
        let err = ValuationConfig::from_json(r#"{"contract_term_years": 400000000}"#).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidInput { ref field, .. } if field == "contract_term_years"));

        let err = ValuationConfig::from_json(r#"{"planning_horizon_years": 101}"#).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidInput { ref field, .. } if field == "planning_horizon_years"));

        assert!(ValuationConfig::from_json(r#"{"contract_term_years": 100}"#).is_ok());
    }
}
