//! Immutable reference data: tariff rate cards and regional yield factors.
//!
//! Tables are parsed and validated once. Structural problems (unparseable
//! JSON, bad band descriptors, impossible capacity factors) are fatal;
//! partition problems in rate cards are data-quality findings that are
//! logged at load and kept on the tables for inspection.

pub mod band;
pub mod tariff;
pub mod validation;
pub mod yields;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

pub use band::CapacityBand;
pub use tariff::{BandRate, PeriodRates, TariffSchedule, TariffTable};
pub use validation::{DataQualityWarning, FindingKind};
pub use yields::{TechnologyYields, YieldEntry, YieldFactor, YieldTable};

use crate::dates::SchemeYear;
use crate::error::ValuationError;
use crate::technology::Technology;
use crate::FitResult;

const EMBEDDED_TARIFFS: &str = include_str!("../../data/fit_tariffs.json");
const EMBEDDED_YIELDS: &str = include_str!("../../data/regional_yields.json");

/// Version label of the tables compiled into the crate.
pub const EMBEDDED_TABLES_VERSION: &str = "fit-2019.03-embedded";

/// Tariff and yield tables plus the findings raised while validating them.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    version: String,
    tariffs: TariffTable,
    yields: YieldTable,
    findings: Vec<DataQualityWarning>,
}

impl ReferenceTables {
    pub fn new(version: impl Into<String>, tariffs: TariffTable, yields: YieldTable) -> Self {
        let findings = validation::validate_tariffs(&tariffs);
        let version = version.into();
        for f in &findings {
            f.log();
        }
        tracing::info!(
            version = %version,
            technologies = tariffs.technologies().count(),
            findings = findings.len(),
            "reference tables loaded"
        );
        Self {
            version,
            tariffs,
            yields,
            findings,
        }
    }

    /// Parse both tables from JSON text.
    pub fn from_json(version: impl Into<String>, tariffs_json: &str, yields_json: &str) -> FitResult<Self> {
        let tariffs = TariffTable::from_json(tariffs_json)?;
        let yields = YieldTable::from_json(yields_json)?;
        Ok(Self::new(version, tariffs, yields))
    }

    /// The tables shipped with the crate.
    pub fn embedded() -> FitResult<Self> {
        Self::from_json(EMBEDDED_TABLES_VERSION, EMBEDDED_TARIFFS, EMBEDDED_YIELDS)
    }

    /// Read both tables from files. The version label combines the file names.
    pub fn from_files(tariffs_path: &Path, yields_path: &Path) -> FitResult<Self> {
        let read = |p: &Path| {
            std::fs::read_to_string(p).map_err(|e| {
                ValuationError::ReferenceData(format!("cannot read '{}': {e}", p.display()))
            })
        };
        let tariffs_json = read(tariffs_path)?;
        let yields_json = read(yields_path)?;
        let version = format!(
            "{}+{}",
            file_label(tariffs_path),
            file_label(yields_path)
        );
        Self::from_json(version, &tariffs_json, &yields_json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tariffs(&self) -> &TariffTable {
        &self.tariffs
    }

    pub fn yields(&self) -> &YieldTable {
        &self.yields
    }

    /// Partition findings raised when the tables were loaded.
    pub fn findings(&self) -> &[DataQualityWarning] {
        &self.findings
    }
}

// ---------------------------------------------------------------------------
// Catalogue and validation report
// ---------------------------------------------------------------------------

/// What the tables know about one technology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnologyCatalogue {
    pub technology: Technology,
    pub first_period: Option<SchemeYear>,
    pub last_period: Option<SchemeYear>,
    pub period_count: usize,
    /// Band descriptors of the latest rate card.
    pub bands: Vec<String>,
    /// Regions with an explicit yield entry.
    pub yield_regions: Vec<String>,
    pub has_all_regions_yield: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCatalogue {
    pub version: String,
    pub technologies: Vec<TechnologyCatalogue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub version: String,
    pub clean: bool,
    pub findings: Vec<DataQualityWarning>,
}

impl ReferenceTables {
    /// Technologies, periods, and bands covered by either table.
    pub fn catalogue(&self) -> TableCatalogue {
        let mut technologies: BTreeSet<&Technology> = self.tariffs.technologies().collect();
        technologies.extend(self.yields.technologies().map(|(t, _)| t));

        let technologies = technologies
            .into_iter()
            .map(|technology| {
                let schedule = self.tariffs.schedule(technology);
                let yields = self.yields.technology(technology);
                let last_period = schedule.and_then(|s| s.last_period());
                TechnologyCatalogue {
                    technology: technology.clone(),
                    first_period: schedule.and_then(|s| s.first_period()),
                    last_period,
                    period_count: schedule.map(|s| s.periods.len()).unwrap_or(0),
                    bands: schedule
                        .zip(last_period)
                        .and_then(|(s, p)| s.period(p))
                        .map(|r| r.bands.iter().map(|b| b.band.to_string()).collect())
                        .unwrap_or_default(),
                    yield_regions: yields
                        .map(|y| y.regional.keys().map(|r| r.key().to_string()).collect())
                        .unwrap_or_default(),
                    has_all_regions_yield: yields.is_some_and(|y| y.all_regions.is_some()),
                }
            })
            .collect();

        TableCatalogue {
            version: self.version.clone(),
            technologies,
        }
    }

    pub fn validation_report(&self) -> ValidationReport {
        ValidationReport {
            version: self.version.clone(),
            clean: self.findings.is_empty(),
            findings: self.findings.clone(),
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
