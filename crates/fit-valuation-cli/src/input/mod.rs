pub mod file;
pub mod stdin;

use serde_json::Value;

use fit_valuation_core::InstallationRecord;

/// Accept either a bare array of records or an object with a `records` array.
pub fn records_from_value(value: Value) -> Result<Vec<InstallationRecord>, Box<dyn std::error::Error>> {
    let records = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map
            .remove("records")
            .ok_or("expected an array of records or an object with a \"records\" array")?,
        _ => return Err("expected an array of records".into()),
    };
    Ok(serde_json::from_value(records)?)
}
