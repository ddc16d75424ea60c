pub mod projector;
pub mod repowering;

pub use projector::{
    contract_expiry, contract_years_remaining, project_revenue, GenerationSource,
    ProjectionInput, RevenueProjection,
};
pub use repowering::{classify, RepoweringWindow};
