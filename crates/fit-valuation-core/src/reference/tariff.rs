use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::band::CapacityBand;
use crate::dates::SchemeYear;
use crate::error::ValuationError;
use crate::technology::Technology;
use crate::types::PencePerKwh;
use crate::FitResult;

/// Wire shape of the tariff table: technology → period label → band → rate.
pub type RawTariffTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, Decimal>>>;

/// One band of a period's rate card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRate {
    pub band: CapacityBand,
    pub rate_p_per_kwh: PencePerKwh,
}

/// All bands for one technology in one scheme year, ordered by capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRates {
    pub period: SchemeYear,
    pub bands: Vec<BandRate>,
}

/// A technology's full rate history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffSchedule {
    pub technology: Technology,
    pub periods: BTreeMap<SchemeYear, PeriodRates>,
}

impl TariffSchedule {
    pub fn first_period(&self) -> Option<SchemeYear> {
        self.periods.keys().next().copied()
    }

    pub fn last_period(&self) -> Option<SchemeYear> {
        self.periods.keys().next_back().copied()
    }

    pub fn period(&self, period: SchemeYear) -> Option<&PeriodRates> {
        self.periods.get(&period)
    }
}

/// Parsed tariff table keyed by technology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffTable {
    schedules: BTreeMap<Technology, TariffSchedule>,
}

impl TariffTable {
    pub fn from_raw(raw: RawTariffTable) -> FitResult<Self> {
        let mut schedules = BTreeMap::new();

        for (tech_key, periods_raw) in raw {
            let technology = Technology::from(tech_key.as_str());
            if schedules.contains_key(&technology) {
                return Err(ValuationError::ReferenceData(format!(
                    "tariff table lists '{tech_key}' more than once (as {technology})"
                )));
            }

            let mut periods = BTreeMap::new();
            for (label, bands_raw) in periods_raw {
                let period: SchemeYear = label.parse().map_err(|_| {
                    ValuationError::ReferenceData(format!(
                        "{technology}: '{label}' is not a scheme year label"
                    ))
                })?;
                if bands_raw.is_empty() {
                    return Err(ValuationError::ReferenceData(format!(
                        "{technology} {period}: no capacity bands defined"
                    )));
                }

                let mut bands = Vec::with_capacity(bands_raw.len());
                for (descriptor, rate) in bands_raw {
                    let band: CapacityBand = descriptor.parse().map_err(|e| match e {
                        ValuationError::ReferenceData(msg) => {
                            ValuationError::ReferenceData(format!("{technology} {period}: {msg}"))
                        }
                        other => other,
                    })?;
                    if rate.is_sign_negative() {
                        return Err(ValuationError::ReferenceData(format!(
                            "{technology} {period} band {band}: negative rate {rate}"
                        )));
                    }
                    bands.push(BandRate {
                        band,
                        rate_p_per_kwh: rate,
                    });
                }
                bands.sort_by(|a, b| a.band.layout_cmp(&b.band));

                if periods
                    .insert(period, PeriodRates { period, bands })
                    .is_some()
                {
                    return Err(ValuationError::ReferenceData(format!(
                        "{technology}: period {period} listed more than once"
                    )));
                }
            }

            if periods.is_empty() {
                return Err(ValuationError::ReferenceData(format!(
                    "{technology}: no tariff periods defined"
                )));
            }

            schedules.insert(
                technology.clone(),
                TariffSchedule {
                    technology,
                    periods,
                },
            );
        }

        if schedules.is_empty() {
            return Err(ValuationError::ReferenceData(
                "tariff table is empty".into(),
            ));
        }

        Ok(Self { schedules })
    }

    pub fn from_json(json: &str) -> FitResult<Self> {
        let raw: RawTariffTable = serde_json::from_str(json).map_err(|e| {
            ValuationError::ReferenceData(format!("tariff table is not valid JSON: {e}"))
        })?;
        Self::from_raw(raw)
    }

    pub fn schedule(&self, technology: &Technology) -> Option<&TariffSchedule> {
        self.schedules.get(technology)
    }

    pub fn schedules(&self) -> impl Iterator<Item = &TariffSchedule> {
        self.schedules.values()
    }

    pub fn technologies(&self) -> impl Iterator<Item = &Technology> {
        self.schedules.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SMALL: &str = r#"{
        "Wind": {
            "2012/13": { ">1500": 4.28, "<=1.5": 21.65, "100-500": 18.04, "1.5-100": 21.65, "500-1500": 9.79 },
            "2011/12": { "<=1.5": 36.2, ">1.5": 19.7 }
        }
    }"#;

    #[test]
    fn test_parse_and_order_bands() {
        let table = TariffTable::from_json(SMALL).unwrap();
        let schedule = table.schedule(&Technology::Wind).unwrap();
        assert_eq!(schedule.first_period(), Some(SchemeYear::starting(2011)));
        assert_eq!(schedule.last_period(), Some(SchemeYear::starting(2012)));

        let bands: Vec<String> = schedule
            .period(SchemeYear::starting(2012))
            .unwrap()
            .bands
            .iter()
            .map(|b| b.band.to_string())
            .collect();
        assert_eq!(bands, vec!["<=1.5", "1.5-100", "100-500", "500-1500", ">1500"]);
    }

    #[test]
    fn test_rates_are_exact_decimals() {
        let table = TariffTable::from_json(SMALL).unwrap();
        let period = table
            .schedule(&Technology::Wind)
            .unwrap()
            .period(SchemeYear::starting(2012))
            .unwrap();
        assert_eq!(period.bands[2].rate_p_per_kwh, dec!(18.04));
    }

    #[test]
    fn test_bad_period_label_is_fatal() {
        let err = TariffTable::from_json(r#"{"wind": {"2012": {"<=5": 1.0}}}"#).unwrap_err();
        assert!(matches!(err, ValuationError::ReferenceData(_)));
    }

    #[test]
    fn test_bad_band_is_fatal() {
        let err = TariffTable::from_json(r#"{"wind": {"2012/13": {"big": 1.0}}}"#).unwrap_err();
        assert!(err.to_string().contains("Wind 2012/13"));
    }

    #[test]
    fn test_negative_rate_is_fatal() {
        assert!(TariffTable::from_json(r#"{"wind": {"2012/13": {"<=5": -1.0}}}"#).is_err());
    }

    #[test]
    fn test_duplicate_technology_aliases_rejected() {
        let err = TariffTable::from_json(
            r#"{"pv": {"2012/13": {"<=4": 21.0}}, "solar": {"2012/13": {"<=4": 21.0}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
