use serde_json::{Map, Value};

/// Columns shown for each batch record in table and CSV output.
const BATCH_COLUMNS: [&str; 11] = [
    "technology",
    "capacity_kw",
    "resolved_period",
    "capacity_band",
    "fit_rate_p_per_kwh",
    "region",
    "capacity_factor",
    "annual_income",
    "total_remaining_value",
    "contract_years_remaining",
    "repowering_window",
];

/// The batch `items` array when `result` is a batch valuation.
pub fn batch_items(result: &Value) -> Option<&Vec<Value>> {
    match result.get("items") {
        Some(Value::Array(items)) if result.get("summary").is_some() => Some(items),
        _ => None,
    }
}

/// Flatten batch items into one row per record with a status column.
pub fn batch_rows(items: &[Value]) -> Vec<Value> {
    items
        .iter()
        .map(|item| {
            let mut row = Map::new();
            row.insert("index".into(), item.get("index").cloned().unwrap_or(Value::Null));
            row.insert("id".into(), item.get("id").cloned().unwrap_or(Value::Null));

            let valuation = item.get("valuation").filter(|v| v.is_object());
            let status = match (valuation, item.get("error")) {
                (Some(v), _) if v.pointer("/rate_source/kind") == Some(&Value::from("unresolved")) => {
                    "rate/period unknown".to_string()
                }
                (Some(_), _) => "valued".to_string(),
                (None, Some(Value::String(e))) => format!("error: {e}"),
                (None, _) => "error".to_string(),
            };

            for col in BATCH_COLUMNS {
                let cell = valuation
                    .and_then(|v| v.get(col))
                    .cloned()
                    .unwrap_or(Value::Null);
                row.insert(col.into(), cell);
            }
            row.insert("status".into(), Value::String(status));
            Value::Object(row)
        })
        .collect()
}
