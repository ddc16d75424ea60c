//! The valuation engine: composes period and band resolution, region and
//! yield lookup, degradation and revenue projection for one installation or
//! a batch of them.
//!
//! The engine owns its reference tables and configuration and never mutates
//! them, so a single instance can be shared across threads.

pub mod batch;
pub mod record;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub use batch::{BatchItem, BatchSummary, BatchValuationOutput};
pub use record::{Enrichment, InstallationRecord, RateSource, ValuationResult};

use crate::config::ValuationConfig;
use crate::dates::{parse_optional_date, whole_years_between, SchemeYear};
use crate::degradation::average_factor;
use crate::error::ValuationError;
use crate::reference::{DataQualityWarning, ReferenceTables, TableCatalogue, ValidationReport};
use crate::region::resolve_region;
use crate::revenue::{contract_expiry, contract_years_remaining, project_revenue, ProjectionInput};
use crate::tariff::{resolve_period, resolve_tariff, validate_capacity, PeriodResolution};
use crate::technology::Technology;
use crate::types::{with_metadata, ComputationOutput};
use crate::yield_model::estimate_yield;
use crate::FitResult;

const VALUATION_METHODOLOGY: &str =
    "FIT valuation: scheme-year tariff x regional capacity factor x degradation x remaining contract term";

/// Outcome of probing which rate card applies to a commissioning date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodProbe {
    pub technology: Technology,
    pub commission_date: Option<NaiveDate>,
    pub target: Option<SchemeYear>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<PeriodResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValuationEngine {
    tables: ReferenceTables,
    config: ValuationConfig,
}

impl ValuationEngine {
    pub fn new(tables: ReferenceTables, config: ValuationConfig) -> FitResult<Self> {
        config.validate()?;
        Ok(Self { tables, config })
    }

    /// Engine over the embedded tables with default settings.
    pub fn with_embedded_tables() -> FitResult<Self> {
        Self::new(ReferenceTables::embedded()?, ValuationConfig::default())
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Value a single installation as of `as_of`.
    ///
    /// Bad input (non-positive capacity, unparseable dates, negative supplied
    /// figures) is an error. A rate that cannot be resolved is not: the result
    /// carries `RateSource::Unresolved` and zero income.
    pub fn value(
        &self,
        record: &InstallationRecord,
        as_of: NaiveDate,
    ) -> FitResult<ComputationOutput<ValuationResult>> {
        let start = Instant::now();
        let (result, warnings) = self.appraise(record, as_of)?;
        let elapsed = start.elapsed().as_micros() as u64;

        Ok(
            with_metadata(VALUATION_METHODOLOGY, record, warnings, elapsed, result)
                .with_tables_version(self.tables.version()),
        )
    }

    pub(crate) fn appraise(
        &self,
        record: &InstallationRecord,
        as_of: NaiveDate,
    ) -> FitResult<(ValuationResult, Vec<String>)> {
        let technology = &record.technology;
        validate_capacity(record.capacity_kw)?;
        let supplied_rate = supplied_figure("tariff_rate_p_per_kwh", record.tariff_rate_p_per_kwh)?;
        let measured_generation = supplied_figure("annual_generation_kwh", record.annual_generation_kwh)?;
        let commissioned = parse_optional_date("commission_date", record.commission_date.as_deref())?;
        let explicit_expiry = parse_optional_date("contract_expiry", record.contract_expiry.as_deref())?;

        let mut findings: Vec<DataQualityWarning> = Vec::new();
        let mut notes: Vec<String> = Vec::new();

        // Rate
        let tariff = match resolve_tariff(
            self.tables.tariffs(),
            technology,
            commissioned,
            record.capacity_kw,
            self.config.max_lookback_years,
        ) {
            Ok(t) => {
                findings.extend(t.warnings(technology));
                Ok(t)
            }
            Err(e) if e.is_unresolved() => Err(e.to_string()),
            Err(e) => return Err(e),
        };

        let (rate, rate_source) = match (supplied_rate, &tariff) {
            (Some(r), _) => (Some(r), RateSource::Supplied),
            (None, Ok(t)) => (Some(t.band.rate_p_per_kwh), RateSource::Tariff),
            (None, Err(reason)) => {
                notes.push(format!("rate/period unknown: {reason}"));
                (
                    None,
                    RateSource::Unresolved {
                        reason: reason.clone(),
                    },
                )
            }
        };
        let tariff = tariff.ok();

        // Yield
        let region = resolve_region(&record.postcode, self.config.default_region);
        findings.extend(region.warning(&record.postcode));
        let yield_estimate = estimate_yield(
            self.tables.yields(),
            technology,
            region.region,
            record.installation_type.as_deref(),
        );
        findings.extend(yield_estimate.warning(technology, region.region));

        // Term and degradation
        let expiry = contract_expiry(commissioned, explicit_expiry, self.config.contract_term_years)?;
        if expiry.is_none() {
            notes.push("no commissioning date or contract expiry; remaining term taken as zero".into());
        }
        let years_remaining = contract_years_remaining(expiry, as_of);
        let years_elapsed = commissioned
            .map(|c| whole_years_between(c, as_of))
            .unwrap_or(0);
        if commissioned.is_none() && expiry.is_some() && technology.degrades() {
            notes.push("no commissioning date; degradation averaged as if newly commissioned".into());
        }
        let window_years = years_remaining.ceil().to_u32().unwrap_or(0);
        let degradation_factor = average_factor(technology, years_elapsed, window_years);

        let projection = project_revenue(&ProjectionInput {
            capacity_kw: record.capacity_kw,
            rate_p_per_kwh: rate,
            yield_factor: yield_estimate.factor,
            measured_generation_kwh: measured_generation,
            degradation_factor,
            contract_years_remaining: years_remaining,
            hours_per_year: self.config.hours_per_year,
            planning_horizon_years: self.config.planning_horizon_years,
        })?;

        for f in &findings {
            f.log();
        }
        tracing::debug!(
            id = record.id.as_deref().unwrap_or("-"),
            %technology,
            region = %region.region,
            window = %projection.repowering_window,
            "installation valued"
        );

        let warnings: Vec<String> = findings
            .iter()
            .map(|f| f.to_string())
            .chain(notes)
            .collect();

        let result = ValuationResult {
            id: record.id.clone(),
            technology: technology.clone(),
            capacity_kw: record.capacity_kw,
            fit_rate_p_per_kwh: rate,
            resolved_period: tariff.as_ref().map(|t| t.period.resolved),
            capacity_band: tariff.as_ref().map(|t| t.band.band),
            rate_source,
            region: region.region,
            region_defaulted: region.defaulted,
            capacity_factor: yield_estimate.factor.capacity_factor,
            yield_source: yield_estimate.source,
            annual_generation_kwh: projection.annual_generation_kwh,
            generation_source: projection.generation_source,
            annual_income: projection.annual_income,
            degradation_factor: projection.degradation_factor,
            total_remaining_value: projection.total_remaining_value,
            confidence_range: projection.confidence_range,
            contract_expiry: expiry,
            contract_years_remaining: projection.contract_years_remaining,
            repowering_window: projection.repowering_window,
        };
        Ok((result, warnings))
    }

    /// Report which rate card a commissioning date maps to without valuing
    /// anything.
    pub fn probe_period(
        &self,
        technology: &Technology,
        commission_date: Option<&str>,
    ) -> FitResult<ComputationOutput<PeriodProbe>> {
        let start = Instant::now();
        let date = parse_optional_date("commission_date", commission_date)?;

        let mut warnings = Vec::new();
        let (resolution, unresolved) = match resolve_period(
            self.tables.tariffs(),
            technology,
            date,
            self.config.max_lookback_years,
        ) {
            Ok(r) => {
                warnings.extend(r.warning(technology).map(|w| w.to_string()));
                (Some(r), None)
            }
            Err(e) if e.is_unresolved() => (None, Some(e.to_string())),
            Err(e) => return Err(e),
        };

        let probe = PeriodProbe {
            technology: technology.clone(),
            commission_date: date,
            target: date.map(SchemeYear::containing),
            resolution,
            unresolved,
        };
        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Scheme years run 1 April to 31 March; missing years fall back to the nearest earlier rate card",
            &self.config,
            warnings,
            elapsed,
            probe,
        )
        .with_tables_version(self.tables.version()))
    }

    pub fn table_catalogue(&self) -> ComputationOutput<TableCatalogue> {
        let start = Instant::now();
        let catalogue = self.tables.catalogue();
        let elapsed = start.elapsed().as_micros() as u64;
        with_metadata(
            "Reference table catalogue",
            &serde_json::json!({ "tables_version": self.tables.version() }),
            Vec::new(),
            elapsed,
            catalogue,
        )
        .with_tables_version(self.tables.version())
    }

    pub fn validate_tables(&self) -> ComputationOutput<ValidationReport> {
        let start = Instant::now();
        let report = self.tables.validation_report();
        let warnings = report.findings.iter().map(|f| f.to_string()).collect();
        let elapsed = start.elapsed().as_micros() as u64;
        with_metadata(
            "Band partition check per technology and scheme year; scheme-year continuity per technology",
            &serde_json::json!({ "tables_version": self.tables.version() }),
            warnings,
            elapsed,
            report,
        )
        .with_tables_version(self.tables.version())
    }
}

/// Caller-supplied figures: zero means absent, negative is invalid.
fn supplied_figure(field: &str, value: Option<Decimal>) -> FitResult<Option<Decimal>> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(ValuationError::invalid(
            field,
            format!("Supplied value cannot be negative, got {v}"),
        )),
        Some(v) if v.is_zero() => Ok(None),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn engine() -> ValuationEngine {
        ValuationEngine::with_embedded_tables().unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn record(tech: &str, kw: Decimal, postcode: &str, date: Option<&str>) -> InstallationRecord {
        InstallationRecord {
            id: Some("T-1".into()),
            technology: Technology::from(tech),
            capacity_kw: kw,
            postcode: postcode.into(),
            commission_date: date.map(String::from),
            contract_expiry: None,
            installation_type: None,
            tariff_rate_p_per_kwh: None,
            annual_generation_kwh: None,
        }
    }

    #[test]
    fn test_missing_date_is_unresolved_not_error() {
        let out = engine()
            .value(&record("wind", dec!(50), "YO17 9AS", None), today())
            .unwrap();
        let r = out.result;
        assert!(!r.is_rate_resolved());
        assert_eq!(r.annual_income, Decimal::ZERO);
        assert_eq!(r.contract_years_remaining, Decimal::ZERO);
        assert!(r.summary_line().contains("rate/period unknown"));
        assert!(out.warnings.iter().any(|w| w.contains("rate/period unknown")));
    }

    #[test]
    fn test_expiry_without_commission_date_notes_degradation_assumption() {
        let mut rec = record("photovoltaic", dec!(4), "EX4 4QJ", None);
        rec.contract_expiry = Some("2030-04-01".into());
        rec.tariff_rate_p_per_kwh = Some(dec!(15.44));
        let out = engine().value(&rec, today()).unwrap();
        assert!(out.result.degradation_factor < Decimal::ONE);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("degradation averaged as if newly commissioned")));

        let mut wind = record("wind", dec!(50), "YO17 9AS", None);
        wind.contract_expiry = Some("2030-04-01".into());
        let out = engine().value(&wind, today()).unwrap();
        assert!(!out.warnings.iter().any(|w| w.contains("newly commissioned")));
    }

    #[test]
    fn test_garbage_date_is_invalid_input() {
        let err = engine()
            .value(&record("wind", dec!(50), "YO17 9AS", Some("next tuesday")), today())
            .unwrap_err();
        assert!(matches!(err, ValuationError::InvalidInput { .. }));
    }

    #[test]
    fn test_negative_supplied_rate_is_invalid_input() {
        let mut rec = record("wind", dec!(50), "YO17 9AS", Some("2012-06-01"));
        rec.tariff_rate_p_per_kwh = Some(dec!(-2));
        assert!(engine().value(&rec, today()).is_err());
    }

    #[test]
    fn test_unmapped_postcode_defaults_and_warns() {
        let out = engine()
            .value(&record("wind", dec!(50), "??", Some("2012-06-01")), today())
            .unwrap();
        assert!(out.result.region_defaulted);
        assert_eq!(out.result.region, crate::region::Region::EastMidlands);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_metadata_carries_tables_version() {
        let out = engine()
            .value(&record("wind", dec!(50), "YO17 9AS", Some("2012-06-01")), today())
            .unwrap();
        assert_eq!(
            out.metadata.tables_version.as_deref(),
            Some(crate::reference::EMBEDDED_TABLES_VERSION)
        );
    }

    #[test]
    fn test_probe_reports_fallback() {
        let out = engine()
            .probe_period(&Technology::Wind, Some("2024-05-01"))
            .unwrap();
        let res = out.result.resolution.unwrap();
        assert_eq!(res.target.to_string(), "2024/25");
        assert_eq!(res.resolved.to_string(), "2019/20");
        assert_eq!(out.warnings.len(), 1);

        let none = engine().probe_period(&Technology::Wind, None).unwrap();
        assert!(none.result.unresolved.is_some());
    }

    #[test]
    fn test_lookback_bound_from_config() {
        let config = ValuationConfig {
            max_lookback_years: Some(2),
            ..ValuationConfig::default()
        };
        let engine = ValuationEngine::new(ReferenceTables::embedded().unwrap(), config).unwrap();
        let out = engine
            .value(&record("wind", dec!(50), "YO17 9AS", Some("2024-05-01")), today())
            .unwrap();
        assert!(!out.result.is_rate_resolved());
    }
}
