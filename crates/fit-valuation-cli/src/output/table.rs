use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::rows;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    if let Some(items) = rows::batch_items(result) {
        print_array_table(&rows::batch_rows(items));
        if let Some(Value::Object(summary)) = result.get("summary") {
            println!("\n{}", "Summary".bold());
            print_flat_object(summary);
        }
    } else if let Value::Object(res_map) = result {
        // Scalars and nested objects in one table; arrays of objects get
        // their own table underneath.
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        let mut sub_tables = Vec::new();
        for (key, val) in res_map {
            match val {
                Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {
                    sub_tables.push((key, arr));
                }
                _ => builder.push_record([key.as_str(), &format_value(val)]),
            }
        }
        println!("{}", Table::from(builder));
        for (key, arr) in sub_tables {
            println!("\n{}", key.bold());
            print_array_table(arr);
        }
    } else {
        print_array_table(std::slice::from_ref(result));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => {
            // Bounds and tagged enums read better inline.
            if let (Some(min), Some(max)) = (map.get("min"), map.get("max")) {
                format!("{} .. {}", format_value(min), format_value(max))
            } else if let Some(Value::String(kind)) = map.get("kind") {
                match map.get("reason") {
                    Some(Value::String(reason)) => format!("{kind}: {reason}"),
                    _ => kind.clone(),
                }
            } else {
                serde_json::to_string(value).unwrap_or_default()
            }
        }
    }
}
