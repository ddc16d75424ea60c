pub mod config;
pub mod dates;
pub mod degradation;
pub mod engine;
pub mod error;
pub mod reference;
pub mod region;
pub mod revenue;
pub mod tariff;
pub mod technology;
pub mod types;
pub mod yield_model;

pub use config::ValuationConfig;
pub use engine::{InstallationRecord, ValuationEngine, ValuationResult};
pub use error::ValuationError;
pub use reference::ReferenceTables;
pub use technology::Technology;
pub use types::*;

/// Standard result type for all valuation operations
pub type FitResult<T> = Result<T, ValuationError>;
