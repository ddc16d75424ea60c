use chrono::NaiveDate;
use fit_valuation_core::degradation::efficiency_in_year;
use fit_valuation_core::engine::RateSource;
use fit_valuation_core::region::Region;
use fit_valuation_core::revenue::{GenerationSource, RepoweringWindow};
use fit_valuation_core::yield_model::YieldSource;
use fit_valuation_core::{Bounds, InstallationRecord, Technology, ValuationEngine, ValuationError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn engine() -> ValuationEngine {
    ValuationEngine::with_embedded_tables().unwrap()
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

fn installation(technology: &str, capacity_kw: Decimal, postcode: &str, commissioned: &str) -> InstallationRecord {
    InstallationRecord {
        id: Some(format!("{technology}-{capacity_kw}")),
        technology: Technology::from(technology),
        capacity_kw,
        postcode: postcode.to_string(),
        commission_date: Some(commissioned.to_string()),
        contract_expiry: None,
        installation_type: None,
        tariff_rate_p_per_kwh: None,
        annual_generation_kwh: None,
    }
}

// ===========================================================================
// Worked scenarios
// ===========================================================================

#[test]
fn test_wind_500kw_yorkshire_2012() {
    let out = engine()
        .value(&installation("wind", dec!(500), "YO17 9AS", "2012-06-01"), as_of())
        .unwrap();
    let r = &out.result;

    assert_eq!(r.resolved_period.map(|p| p.to_string()).as_deref(), Some("2012/13"));
    assert_eq!(r.capacity_band.map(|b| b.to_string()).as_deref(), Some("100-500"));
    assert_eq!(r.fit_rate_p_per_kwh, Some(dec!(18.04)));
    assert_eq!(r.rate_source, RateSource::Tariff);

    assert_eq!(r.region, Region::YorkshireAndTheHumber);
    assert!(!r.region_defaulted);
    assert_eq!(r.yield_source, YieldSource::Regional);
    assert!(r.capacity_factor >= dec!(0.27) && r.capacity_factor <= dec!(0.30));

    // 500 kW x 8760 h x 0.28
    assert_eq!(r.annual_generation_kwh, dec!(1226400));
    assert_eq!(r.generation_source, GenerationSource::Estimated);
    // 1,226,400 kWh x 18.04p / 100
    assert_eq!(r.annual_income, dec!(221242.56));

    // Expiry 2032-06-01: 2056 days / 365.25 = 5.63 -> 5.6
    assert_eq!(r.contract_expiry, NaiveDate::from_ymd_opt(2032, 6, 1));
    assert_eq!(r.contract_years_remaining, dec!(5.6));
    assert_eq!(r.repowering_window, RepoweringWindow::Optimal);

    assert_eq!(r.degradation_factor, Decimal::ONE);
    assert_eq!(r.total_remaining_value, dec!(1238958.34));
    assert_eq!(
        r.confidence_range,
        Bounds::new(dec!(1194709.82), dec!(1327455.36))
    );
    assert!(out.warnings.is_empty());
}

#[test]
fn test_pv_commissioned_twelve_years_ago() {
    let out = engine()
        .value(&installation("photovoltaic", dec!(4), "EX4 4QJ", "2014-10-15"), as_of())
        .unwrap();
    let r = &out.result;

    assert_eq!(r.resolved_period.map(|p| p.to_string()).as_deref(), Some("2014/15"));
    assert_eq!(r.capacity_band.map(|b| b.to_string()).as_deref(), Some("<=4"));
    assert_eq!(r.region, Region::SouthWestEngland);
    assert_eq!(r.capacity_factor, dec!(0.112));
    assert_eq!(r.contract_years_remaining, dec!(8.0));

    let pv = Technology::Photovoltaic;
    assert!(r.degradation_factor < Decimal::ONE);
    assert!(r.degradation_factor < efficiency_in_year(&pv, 12));
    assert!(r.degradation_factor > efficiency_in_year(&pv, 20));

    // Degradation scales lifetime value, not the current-year figures.
    assert_eq!(r.annual_generation_kwh, dec!(3924.48));
    let undegraded = r.annual_income * r.contract_years_remaining;
    assert!(r.total_remaining_value < undegraded);
    let expected = undegraded * r.degradation_factor;
    assert!((r.total_remaining_value - expected).abs() < dec!(0.1));
    assert_eq!(r.repowering_window, RepoweringWindow::Optimal);
}

#[test]
fn test_post_closure_rate_is_zero_not_unknown() {
    let out = engine()
        .value(&installation("wind", dec!(50), "IV1 1AA", "2019-06-01"), as_of())
        .unwrap();
    let r = &out.result;
    assert!(r.is_rate_resolved());
    assert_eq!(r.fit_rate_p_per_kwh, Some(Decimal::ZERO));
    assert_eq!(r.annual_income, Decimal::ZERO);
    assert_eq!(r.total_remaining_value, Decimal::ZERO);
    assert!(!r.summary_line().contains("unknown"));
}

#[test]
fn test_unrecognised_technology_is_unresolved() {
    let out = engine()
        .value(&installation("tidal stream", dec!(100), "PL1 1AA", "2013-05-01"), as_of())
        .unwrap();
    let r = &out.result;
    assert!(matches!(r.rate_source, RateSource::Unresolved { .. }));
    assert_eq!(r.fit_rate_p_per_kwh, None);
    assert_eq!(r.resolved_period, None);
    assert_eq!(r.annual_income, Decimal::ZERO);
    assert_eq!(r.yield_source, YieldSource::NationalDefault);
    assert_eq!(r.capacity_factor, dec!(0.20));
    assert!(r.summary_line().ends_with("rate/period unknown"));
}

#[test]
fn test_hydro_outside_table_regions_uses_national_default() {
    let out = engine()
        .value(&installation("hydro", dec!(50), "NG1 1AA", "2013-05-01"), as_of())
        .unwrap();
    assert_eq!(out.result.yield_source, YieldSource::NationalDefault);
    assert_eq!(out.result.capacity_factor, dec!(0.35));
    assert!(out.warnings.iter().any(|w| w.contains("national default")));
}

// ===========================================================================
// Overrides
// ===========================================================================

#[test]
fn test_supplied_rate_overrides_table() {
    let mut rec = installation("wind", dec!(500), "YO17 9AS", "2012-06-01");
    rec.tariff_rate_p_per_kwh = Some(dec!(20));
    let r = engine().value(&rec, as_of()).unwrap().result;
    assert_eq!(r.rate_source, RateSource::Supplied);
    assert_eq!(r.fit_rate_p_per_kwh, Some(dec!(20)));
    assert_eq!(r.annual_income, dec!(245280));
    // The period is still reported for reference.
    assert_eq!(r.resolved_period.map(|p| p.to_string()).as_deref(), Some("2012/13"));
}

#[test]
fn test_supplied_rate_rescues_undated_record() {
    let mut rec = installation("wind", dec!(500), "YO17 9AS", "");
    rec.tariff_rate_p_per_kwh = Some(dec!(20));
    rec.contract_expiry = Some("2030-01-01".into());
    let r = engine().value(&rec, as_of()).unwrap().result;
    assert_eq!(r.rate_source, RateSource::Supplied);
    assert_eq!(r.resolved_period, None);
    assert!(r.total_remaining_value > Decimal::ZERO);
}

#[test]
fn test_measured_generation_overrides_estimate() {
    let mut rec = installation("wind", dec!(500), "YO17 9AS", "2012-06-01");
    rec.annual_generation_kwh = Some(dec!(1000000));
    let r = engine().value(&rec, as_of()).unwrap().result;
    assert_eq!(r.generation_source, GenerationSource::Measured);
    assert_eq!(r.annual_generation_kwh, dec!(1000000));
    assert_eq!(r.annual_income, dec!(180400));
    assert_eq!(r.confidence_range.min, r.confidence_range.max);
}

#[test]
fn test_zero_overrides_are_ignored() {
    let mut rec = installation("wind", dec!(500), "YO17 9AS", "2012-06-01");
    rec.tariff_rate_p_per_kwh = Some(Decimal::ZERO);
    rec.annual_generation_kwh = Some(Decimal::ZERO);
    let r = engine().value(&rec, as_of()).unwrap().result;
    assert_eq!(r.rate_source, RateSource::Tariff);
    assert_eq!(r.generation_source, GenerationSource::Estimated);
}

#[test]
fn test_explicit_expiry_overrides_term() {
    let mut rec = installation("wind", dec!(500), "YO17 9AS", "2012-06-01");
    rec.contract_expiry = Some("2027-10-15".into());
    let r = engine().value(&rec, as_of()).unwrap().result;
    assert_eq!(r.contract_years_remaining, dec!(1.0));
    assert_eq!(r.repowering_window, RepoweringWindow::Immediate);
}

#[test]
fn test_installation_type_selects_sub_type_yield() {
    let mut rec = installation("photovoltaic", dec!(40), "EX4 4QJ", "2014-10-15");
    rec.installation_type = Some("Ground-Mounted".into());
    let r = engine().value(&rec, as_of()).unwrap().result;
    assert_eq!(r.capacity_factor, dec!(0.122));
}

// ===========================================================================
// Errors and invariants
// ===========================================================================

#[test]
fn test_zero_capacity_is_invalid_input() {
    let err = engine()
        .value(&installation("wind", Decimal::ZERO, "YO17 9AS", "2012-06-01"), as_of())
        .unwrap_err();
    assert!(matches!(err, ValuationError::InvalidInput { ref field, .. } if field == "capacity_kw"));
}

#[test]
fn test_expired_contract_has_zero_remaining_value() {
    let out = engine()
        .value(&installation("wind", dec!(50), "YO17 9AS", "2005-06-01"), as_of())
        .unwrap();
    let r = &out.result;
    assert_eq!(r.contract_years_remaining, Decimal::ZERO);
    assert_eq!(r.total_remaining_value, Decimal::ZERO);
    assert_eq!(r.repowering_window, RepoweringWindow::Expired);
}

#[test]
fn test_valuation_is_deterministic() {
    let engine = engine();
    let rec = installation("photovoltaic", dec!(4), "EX4 4QJ", "2014-10-15");
    let a = engine.value(&rec, as_of()).unwrap();
    let b = engine.value(&rec, as_of()).unwrap();
    assert_eq!(a.result, b.result);
    assert_eq!(a.warnings, b.warnings);
}

#[test]
fn test_enrichment_projects_persisted_fields() {
    let r = engine()
        .value(&installation("wind", dec!(500), "YO17 9AS", "2012-06-01"), as_of())
        .unwrap()
        .result;
    let e = r.enrichment();
    assert_eq!(e.tariff_period.as_deref(), Some("2012/13"));
    assert_eq!(e.capacity_band.as_deref(), Some("100-500"));
    assert_eq!(e.region, "yorkshire_and_the_humber");
    assert_eq!(e.annual_income, r.annual_income);
    assert_eq!(e.repowering_window, RepoweringWindow::Optimal);
}

#[test]
fn test_result_serialises_decimals_as_strings() {
    let r = engine()
        .value(&installation("wind", dec!(500), "YO17 9AS", "2012-06-01"), as_of())
        .unwrap()
        .result;
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["fit_rate_p_per_kwh"], "18.04");
    assert_eq!(json["resolved_period"], "2012/13");
    assert_eq!(json["repowering_window"], "optimal");
    assert_eq!(json["rate_source"]["kind"], "tariff");
}
