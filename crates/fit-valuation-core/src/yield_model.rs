use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::reference::{DataQualityWarning, FindingKind, YieldFactor, YieldTable};
use crate::region::Region;
use crate::technology::Technology;
use crate::types::Bounds;

/// Which level of the lookup produced the yield assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldSource {
    /// Exact (technology, region) entry.
    Regional,
    /// The technology's `all_regions` entry.
    AllRegions,
    /// Hard-coded national default.
    NationalDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldEstimate {
    pub factor: YieldFactor,
    pub source: YieldSource,
    /// Installation sub-type whose variant was applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
}

impl YieldEstimate {
    pub fn warning(&self, technology: &Technology, region: Region) -> Option<DataQualityWarning> {
        (self.source == YieldSource::NationalDefault).then(|| {
            DataQualityWarning::new(
                FindingKind::YieldDefaulted,
                Some(technology),
                format!(
                    "no yield entry for {region}; using national default capacity factor {}",
                    self.factor.capacity_factor
                ),
            )
        })
    }
}

/// National default capacity factors used when the table has nothing to say.
pub fn national_default(technology: &Technology) -> YieldFactor {
    let (cf, min, max) = match technology {
        Technology::Wind => (dec!(0.25), dec!(0.18), dec!(0.35)),
        Technology::Photovoltaic => (dec!(0.10), dec!(0.08), dec!(0.12)),
        Technology::Hydro => (dec!(0.35), dec!(0.15), dec!(0.40)),
        _ => (dec!(0.20), dec!(0.10), dec!(0.30)),
    };
    YieldFactor {
        capacity_factor: cf,
        range: Bounds::new(min, max),
    }
}

/// Expected capacity factor for a technology in a region.
///
/// Lookup order: exact region → `all_regions` → national default. Within a
/// table entry, a matching sub-type variant takes precedence over the base.
pub fn estimate_yield(
    yields: &YieldTable,
    technology: &Technology,
    region: Region,
    sub_type: Option<&str>,
) -> YieldEstimate {
    let by_tech = yields.technology(technology);

    let table_hit = by_tech.and_then(|t| {
        t.regional
            .get(&region)
            .map(|e| (e, YieldSource::Regional))
            .or_else(|| t.all_regions.as_ref().map(|e| (e, YieldSource::AllRegions)))
    });

    match table_hit {
        Some((entry, source)) => {
            let (factor, sub_type) = entry.for_sub_type(sub_type);
            YieldEstimate {
                factor,
                source,
                sub_type,
            }
        }
        None => YieldEstimate {
            factor: national_default(technology),
            source: YieldSource::NationalDefault,
            sub_type: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> YieldTable {
        YieldTable::from_json(
            r#"{
                "wind": { "yorkshire_and_the_humber": { "cf": 0.28, "range": [0.27, 0.30] } },
                "photovoltaic": { "london": { "cf": 0.103, "range": [0.088, 0.118],
                    "sub_types": { "ground_mounted": { "cf": 0.113, "range": [0.098, 0.128] } } } },
                "anaerobic_digestion": { "all_regions": { "cf": 0.8, "range": [0.7, 0.9] } }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_regional_hit() {
        let y = estimate_yield(&table(), &Technology::Wind, Region::YorkshireAndTheHumber, None);
        assert_eq!(y.source, YieldSource::Regional);
        assert_eq!(y.factor.capacity_factor, dec!(0.28));
        assert!(y.warning(&Technology::Wind, Region::YorkshireAndTheHumber).is_none());
    }

    #[test]
    fn test_all_regions_wildcard_for_region_invariant_tech() {
        let y = estimate_yield(&table(), &Technology::AnaerobicDigestion, Region::Scotland, None);
        assert_eq!(y.source, YieldSource::AllRegions);
        assert_eq!(y.factor.capacity_factor, dec!(0.8));
    }

    #[test]
    fn test_national_defaults() {
        let t = table();
        let wind = estimate_yield(&t, &Technology::Wind, Region::London, None);
        assert_eq!(wind.source, YieldSource::NationalDefault);
        assert_eq!(wind.factor.capacity_factor, dec!(0.25));
        assert!(wind.warning(&Technology::Wind, Region::London).is_some());

        assert_eq!(
            estimate_yield(&t, &Technology::Photovoltaic, Region::Wales, None).factor.capacity_factor,
            dec!(0.10)
        );
        let hydro = estimate_yield(&t, &Technology::Hydro, Region::London, None).factor;
        assert_eq!(hydro.range, Bounds::new(dec!(0.15), dec!(0.40)));
        assert_eq!(
            estimate_yield(&t, &Technology::Unrecognized("tidal".into()), Region::London, None)
                .factor
                .capacity_factor,
            dec!(0.20)
        );
    }

    #[test]
    fn test_sub_type_variant() {
        let y = estimate_yield(&table(), &Technology::Photovoltaic, Region::London, Some("Ground Mounted"));
        assert_eq!(y.factor.capacity_factor, dec!(0.113));
        assert_eq!(y.sub_type.as_deref(), Some("ground_mounted"));
    }

    #[test]
    fn test_defaults_satisfy_range_invariant() {
        for tech in Technology::KNOWN {
            let f = national_default(&tech);
            assert!(f.capacity_factor > dec!(0) && f.capacity_factor <= dec!(1));
            assert!(f.range.contains(f.capacity_factor));
        }
    }
}
