use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValuationError;
use crate::region::Region;
use crate::technology::Technology;
use crate::types::{Bounds, Fraction};
use crate::FitResult;

/// Key used for region-invariant technologies.
pub const ALL_REGIONS_KEY: &str = "all_regions";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawYieldFactor {
    pub cf: Decimal,
    pub range: [Decimal; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawYieldEntry {
    pub cf: Decimal,
    pub range: [Decimal; 2],
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_types: BTreeMap<String, RawYieldFactor>,
}

/// Wire shape: technology → region key (or `all_regions`) → entry.
pub type RawYieldTable = BTreeMap<String, BTreeMap<String, RawYieldEntry>>;

/// A capacity factor and the range it plausibly sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldFactor {
    pub capacity_factor: Fraction,
    pub range: Bounds,
}

impl YieldFactor {
    /// Build a factor, enforcing `0 < cf <= 1` and `0 <= min <= cf <= max <= 1`.
    pub fn new(capacity_factor: Fraction, range: Bounds) -> FitResult<Self> {
        if capacity_factor <= Decimal::ZERO || capacity_factor > Decimal::ONE {
            return Err(ValuationError::ReferenceData(format!(
                "capacity factor {capacity_factor} outside (0, 1]"
            )));
        }
        if range.min.is_sign_negative() || range.max > Decimal::ONE {
            return Err(ValuationError::ReferenceData(format!(
                "plausible range [{}, {}] outside [0, 1]",
                range.min, range.max
            )));
        }
        if !range.contains(capacity_factor) {
            return Err(ValuationError::ReferenceData(format!(
                "plausible range [{}, {}] does not contain capacity factor {capacity_factor}",
                range.min, range.max
            )));
        }
        Ok(Self {
            capacity_factor,
            range,
        })
    }

    fn from_parts(cf: Decimal, range: [Decimal; 2], context: &str) -> FitResult<Self> {
        Self::new(cf, Bounds::new(range[0], range[1])).map_err(|e| match e {
            ValuationError::ReferenceData(msg) => {
                ValuationError::ReferenceData(format!("{context}: {msg}"))
            }
            other => other,
        })
    }
}

/// One region's yield assumption with optional per-installation-type variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldEntry {
    pub factor: YieldFactor,
    pub sub_types: BTreeMap<String, YieldFactor>,
}

impl YieldEntry {
    /// The sub-type variant when one is requested and present, else the base.
    pub fn for_sub_type(&self, sub_type: Option<&str>) -> (YieldFactor, Option<String>) {
        if let Some(key) = sub_type.map(normalise_sub_type) {
            if let Some(f) = self.sub_types.get(&key) {
                return (*f, Some(key));
            }
        }
        (self.factor, None)
    }
}

pub(crate) fn normalise_sub_type(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyYields {
    pub regional: BTreeMap<Region, YieldEntry>,
    pub all_regions: Option<YieldEntry>,
}

/// Parsed regional yield table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldTable {
    technologies: BTreeMap<Technology, TechnologyYields>,
}

impl YieldTable {
    pub fn from_raw(raw: RawYieldTable) -> FitResult<Self> {
        let mut technologies = BTreeMap::new();

        for (tech_key, regions_raw) in raw {
            let technology = Technology::from(tech_key.as_str());
            let mut yields = TechnologyYields::default();

            for (region_key, entry) in regions_raw {
                let context = format!("{technology} / {region_key}");
                let factor = YieldFactor::from_parts(entry.cf, entry.range, &context)?;
                let mut sub_types = BTreeMap::new();
                for (sub_key, sub) in entry.sub_types {
                    let sub_ctx = format!("{context} / {sub_key}");
                    sub_types.insert(
                        normalise_sub_type(&sub_key),
                        YieldFactor::from_parts(sub.cf, sub.range, &sub_ctx)?,
                    );
                }
                let parsed = YieldEntry { factor, sub_types };

                if region_key.trim().eq_ignore_ascii_case(ALL_REGIONS_KEY) {
                    yields.all_regions = Some(parsed);
                } else {
                    let region: Region = region_key.parse().map_err(|_| {
                        ValuationError::ReferenceData(format!(
                            "{technology}: unknown region '{region_key}' in yield table"
                        ))
                    })?;
                    yields.regional.insert(region, parsed);
                }
            }

            if technologies.insert(technology.clone(), yields).is_some() {
                return Err(ValuationError::ReferenceData(format!(
                    "yield table lists {technology} more than once"
                )));
            }
        }

        Ok(Self { technologies })
    }

    pub fn from_json(json: &str) -> FitResult<Self> {
        let raw: RawYieldTable = serde_json::from_str(json).map_err(|e| {
            ValuationError::ReferenceData(format!("yield table is not valid JSON: {e}"))
        })?;
        Self::from_raw(raw)
    }

    pub fn technology(&self, technology: &Technology) -> Option<&TechnologyYields> {
        self.technologies.get(technology)
    }

    pub fn technologies(&self) -> impl Iterator<Item = (&Technology, &TechnologyYields)> {
        self.technologies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_regional_and_wildcard() {
        let table = YieldTable::from_json(
            r#"{
                "wind": { "scotland": { "cf": 0.32, "range": [0.26, 0.38] } },
                "anaerobic_digestion": { "all_regions": { "cf": 0.8, "range": [0.7, 0.9] } }
            }"#,
        )
        .unwrap();

        let wind = table.technology(&Technology::Wind).unwrap();
        assert_eq!(
            wind.regional[&Region::Scotland].factor.capacity_factor,
            dec!(0.32)
        );
        assert!(wind.all_regions.is_none());

        let ad = table.technology(&Technology::AnaerobicDigestion).unwrap();
        assert!(ad.regional.is_empty());
        assert_eq!(ad.all_regions.as_ref().unwrap().factor.range.max, dec!(0.9));
    }

    #[test]
    fn test_sub_type_selection() {
        let table = YieldTable::from_json(
            r#"{ "photovoltaic": { "london": {
                "cf": 0.10, "range": [0.09, 0.12],
                "sub_types": { "Ground Mounted": { "cf": 0.11, "range": [0.10, 0.13] } }
            } } }"#,
        )
        .unwrap();
        let entry = &table.technology(&Technology::Photovoltaic).unwrap().regional[&Region::London];

        let (f, used) = entry.for_sub_type(Some("ground-mounted"));
        assert_eq!(f.capacity_factor, dec!(0.11));
        assert_eq!(used.as_deref(), Some("ground_mounted"));

        let (f, used) = entry.for_sub_type(Some("floating"));
        assert_eq!(f.capacity_factor, dec!(0.10));
        assert!(used.is_none());
    }

    #[test]
    fn test_range_must_contain_cf() {
        let err = YieldTable::from_json(
            r#"{ "wind": { "wales": { "cf": 0.5, "range": [0.1, 0.3] } } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not contain"));
    }

    #[test]
    fn test_cf_must_be_positive() {
        assert!(YieldTable::from_json(
            r#"{ "wind": { "wales": { "cf": 0, "range": [0, 0.3] } } }"#
        )
        .is_err());
    }

    #[test]
    fn test_unknown_region_is_fatal() {
        let err = YieldTable::from_json(
            r#"{ "wind": { "mordor": { "cf": 0.2, "range": [0.1, 0.3] } } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("mordor"));
    }
}
