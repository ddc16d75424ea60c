use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::record::{InstallationRecord, ValuationResult};
use super::ValuationEngine;
use crate::revenue::RepoweringWindow;
use crate::types::{with_metadata, ComputationOutput, Money};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One record's outcome. Exactly one of `valuation` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Position in the input sequence.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation: Option<ValuationResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn is_valued(&self) -> bool {
        self.valuation.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub records: usize,
    /// Records valued with a known rate.
    pub valued: usize,
    /// Records valued but with the rate unresolved.
    pub unresolved: usize,
    /// Records rejected as invalid input.
    pub failed: usize,
    pub by_window: BTreeMap<RepoweringWindow, usize>,
    pub total_annual_income: Money,
    pub total_remaining_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchValuationOutput {
    pub items: Vec<BatchItem>,
    pub summary: BatchSummary,
}

// ---------------------------------------------------------------------------
// Batch valuation
// ---------------------------------------------------------------------------

impl ValuationEngine {
    /// Value every record independently. Output order matches input order and
    /// a failing record never affects the others.
    pub fn value_batch(
        &self,
        records: &[InstallationRecord],
        as_of: NaiveDate,
    ) -> ComputationOutput<BatchValuationOutput> {
        let start = Instant::now();

        #[cfg(feature = "parallel")]
        let items: Vec<BatchItem> = records
            .par_iter()
            .enumerate()
            .map(|(index, record)| self.batch_item(index, record, as_of))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let items: Vec<BatchItem> = records
            .iter()
            .enumerate()
            .map(|(index, record)| self.batch_item(index, record, as_of))
            .collect();

        let summary = summarise(&items);
        tracing::info!(
            records = summary.records,
            valued = summary.valued,
            unresolved = summary.unresolved,
            failed = summary.failed,
            "batch valuation complete"
        );

        let mut warnings = Vec::new();
        if summary.failed > 0 {
            warnings.push(format!(
                "{} of {} records rejected as invalid input",
                summary.failed, summary.records
            ));
        }
        if summary.unresolved > 0 {
            warnings.push(format!(
                "{} of {} records have rate/period unknown",
                summary.unresolved, summary.records
            ));
        }

        let assumptions = serde_json::json!({
            "as_of": as_of,
            "records": records.len(),
            "config": self.config(),
        });
        let elapsed = start.elapsed().as_micros() as u64;
        with_metadata(
            "Independent per-record FIT valuation; results in input order",
            &assumptions,
            warnings,
            elapsed,
            BatchValuationOutput { items, summary },
        )
        .with_tables_version(self.tables().version())
    }

    fn batch_item(&self, index: usize, record: &InstallationRecord, as_of: NaiveDate) -> BatchItem {
        match self.appraise(record, as_of) {
            Ok((valuation, warnings)) => BatchItem {
                index,
                id: record.id.clone(),
                valuation: Some(valuation),
                warnings,
                error: None,
            },
            Err(e) => {
                tracing::warn!(index, id = record.id.as_deref().unwrap_or("-"), error = %e, "record skipped");
                BatchItem {
                    index,
                    id: record.id.clone(),
                    valuation: None,
                    warnings: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn summarise(items: &[BatchItem]) -> BatchSummary {
    let mut summary = BatchSummary {
        records: items.len(),
        ..BatchSummary::default()
    };

    for item in items {
        let Some(v) = &item.valuation else {
            summary.failed += 1;
            continue;
        };
        if v.is_rate_resolved() {
            summary.valued += 1;
        } else {
            summary.unresolved += 1;
        }
        *summary.by_window.entry(v.repowering_window).or_insert(0) += 1;
        summary.total_annual_income += v.annual_income;
        summary.total_remaining_value += v.total_remaining_value;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technology::Technology;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn rec(id: &str, kw: Decimal, date: Option<&str>) -> InstallationRecord {
        InstallationRecord {
            id: Some(id.into()),
            technology: Technology::Wind,
            capacity_kw: kw,
            postcode: "YO17 9AS".into(),
            commission_date: date.map(String::from),
            contract_expiry: None,
            installation_type: None,
            tariff_rate_p_per_kwh: None,
            annual_generation_kwh: None,
        }
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let engine = ValuationEngine::with_embedded_tables().unwrap();
        let records = vec![
            rec("a", dec!(500), Some("2012-06-01")),
            rec("b", dec!(-1), Some("2012-06-01")),
            rec("c", dec!(10), None),
            rec("d", dec!(5), Some("2015-01-10")),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let out = engine.value_batch(&records, today);

        let ids: Vec<_> = out.result.items.iter().map(|i| i.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert!(out.result.items[1].error.is_some());

        let s = &out.result.summary;
        assert_eq!(s.records, 4);
        assert_eq!(s.valued, 2);
        assert_eq!(s.unresolved, 1);
        assert_eq!(s.failed, 1);
        assert_eq!(s.by_window.values().sum::<usize>(), 3);
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_empty_batch() {
        let engine = ValuationEngine::with_embedded_tables().unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let out = engine.value_batch(&[], today);
        assert!(out.result.items.is_empty());
        assert_eq!(out.result.summary.total_annual_income, Decimal::ZERO);
    }
}
