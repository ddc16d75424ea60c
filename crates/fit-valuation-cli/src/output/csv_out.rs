use serde_json::Value;
use std::io;

use super::rows;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) if rows::batch_items(result).is_some() => {
                if let Some(items) = rows::batch_items(result) {
                    write_array_csv(&mut wtr, &rows::batch_rows(items));
                }
            }
            Some(Value::Object(result)) => {
                // A result carrying one array of objects (series, findings)
                // is written as that table; otherwise field/value pairs.
                let nested = result
                    .values()
                    .find_map(|v| v.as_array().filter(|a| a.first().is_some_and(Value::is_object)));
                match nested {
                    Some(arr) => write_array_csv(&mut wtr, arr),
                    None => write_pairs(&mut wtr, result),
                }
            }
            _ => write_pairs(&mut wtr, map),
        },
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_pairs(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(map) => match (map.get("min"), map.get("max"), map.get("kind")) {
            (Some(min), Some(max), _) => {
                format!("{}..{}", format_csv_value(min), format_csv_value(max))
            }
            (_, _, Some(Value::String(kind))) => kind.clone(),
            _ => serde_json::to_string(value).unwrap_or_default(),
        },
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
