use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary values in pounds. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Tariff rates in pence per kWh (not a fraction).
pub type PencePerKwh = Decimal;

/// Installed capacity in kW.
pub type Kilowatts = Decimal;

/// Energy in kWh.
pub type KilowattHours = Decimal;

/// Capacity factors and efficiencies expressed as decimals (0.25 = 25%).
pub type Fraction = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Inclusive (min, max) pair used for plausible yield ranges and confidence
/// intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl Bounds {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// A degenerate range at a single point.
    pub fn point(value: Decimal) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn map(&self, f: impl Fn(Decimal) -> Decimal) -> Self {
        Self {
            min: f(self.min),
            max: f(self.max),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
    /// Version label of the reference tables used, when tables were involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables_version: Option<String>,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
            tables_version: None,
        },
    }
}

impl<T: Serialize> ComputationOutput<T> {
    /// Stamp the reference table version onto the metadata.
    pub fn with_tables_version(mut self, version: &str) -> Self {
        self.metadata.tables_version = Some(version.to_string());
        self
    }
}
