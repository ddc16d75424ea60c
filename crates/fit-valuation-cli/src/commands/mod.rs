pub mod batch;
pub mod degradation;
pub mod period;
pub mod tables;
pub mod value;
