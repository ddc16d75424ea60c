use std::sync::OnceLock;

use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;

use fit_valuation_core::degradation::{self, DegradationInput};
use fit_valuation_core::{InstallationRecord, Technology, ValuationEngine};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

static ENGINE: OnceLock<Result<ValuationEngine, String>> = OnceLock::new();

/// Engine over the embedded reference tables, built on first use.
fn engine() -> NapiResult<&'static ValuationEngine> {
    ENGINE
        .get_or_init(|| ValuationEngine::with_embedded_tables().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(to_napi_error)
}

fn parse_as_of(as_of: &str) -> NapiResult<NaiveDate> {
    NaiveDate::parse_from_str(as_of, "%Y-%m-%d")
        .map_err(|e| to_napi_error(format!("as_of '{as_of}': {e}")))
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn value_installation(record_json: String, as_of: String) -> NapiResult<String> {
    let record: InstallationRecord = serde_json::from_str(&record_json).map_err(to_napi_error)?;
    let output = engine()?
        .value(&record, parse_as_of(&as_of)?)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn value_installations(records_json: String, as_of: String) -> NapiResult<String> {
    let records: Vec<InstallationRecord> =
        serde_json::from_str(&records_json).map_err(to_napi_error)?;
    let output = engine()?.value_batch(&records, parse_as_of(&as_of)?);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reference tables
// ---------------------------------------------------------------------------

#[napi]
pub fn resolve_period(technology: String, commission_date: Option<String>) -> NapiResult<String> {
    let technology: Technology = technology.parse().map_err(to_napi_error)?;
    let output = engine()?
        .probe_period(&technology, commission_date.as_deref())
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_tables() -> NapiResult<String> {
    serde_json::to_string(&engine()?.validate_tables()).map_err(to_napi_error)
}

#[napi]
pub fn list_tables() -> NapiResult<String> {
    serde_json::to_string(&engine()?.table_catalogue()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Degradation
// ---------------------------------------------------------------------------

#[napi]
pub fn degradation_schedule(input_json: String) -> NapiResult<String> {
    let input: DegradationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = degradation::degradation_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
