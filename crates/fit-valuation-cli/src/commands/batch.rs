use clap::Args;
use serde_json::Value;

use fit_valuation_core::InstallationRecord;

use crate::context;
use crate::input;
use crate::GlobalOpts;

/// Arguments for batch valuation
#[derive(Args)]
pub struct BatchArgs {
    /// Records file: JSON array, JSON object with "records", or CSV with a header row
    #[arg(long)]
    pub input: Option<String>,

    /// Emit only the batch summary
    #[arg(long)]
    pub summary_only: bool,

    /// Emit only the fields a store persists back, one row per valued record
    #[arg(long, conflicts_with = "summary_only")]
    pub enrichment: bool,
}

pub fn run_batch(args: BatchArgs, global: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let records: Vec<InstallationRecord> = if let Some(ref path) = args.input {
        if input::file::has_extension(path, "csv") {
            input::file::read_records_csv(path)?
        } else {
            input::records_from_value(input::file::read_json_value(path)?)?
        }
    } else if let Some(records) = input::stdin::read_stdin_records()? {
        records
    } else {
        return Err("--input file (or piped records) is required for batch valuation".into());
    };

    let engine = context::build_engine(global)?;
    let output = engine.value_batch(&records, context::as_of(global));

    if args.summary_only {
        return Ok(serde_json::json!({
            "result": output.result.summary,
            "warnings": output.warnings,
            "metadata": output.metadata,
        }));
    }

    if args.enrichment {
        let rows: Vec<Value> = output
            .result
            .items
            .iter()
            .filter_map(|item| {
                let v = item.valuation.as_ref()?;
                let mut row = serde_json::to_value(v.enrichment()).ok()?;
                if let Value::Object(ref mut map) = row {
                    map.insert("id".into(), serde_json::json!(item.id));
                    map.insert("summary".into(), Value::String(v.summary_line()));
                }
                Some(row)
            })
            .collect();
        return Ok(Value::Array(rows));
    }

    Ok(serde_json::to_value(output)?)
}
