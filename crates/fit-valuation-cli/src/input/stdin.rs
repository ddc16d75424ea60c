use serde_json::Value;
use std::io::{self, Read};

use fit_valuation_core::InstallationRecord;

/// Raw piped stdin, or None when stdin is a TTY or empty.
pub fn read_stdin_text() -> Result<Option<String>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}

/// Piped JSON from stdin, if any.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    match read_stdin_text()? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

/// Piped records: JSON when the text opens with `[` or `{`, CSV otherwise.
pub fn read_stdin_records() -> Result<Option<Vec<InstallationRecord>>, Box<dyn std::error::Error>> {
    let Some(text) = read_stdin_text()? else {
        return Ok(None);
    };
    if text.starts_with('[') || text.starts_with('{') {
        let value: Value = serde_json::from_str(&text)?;
        return Ok(Some(super::records_from_value(value)?));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let records = reader
        .deserialize::<InstallationRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(records))
}
