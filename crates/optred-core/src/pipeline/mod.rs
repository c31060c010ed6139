pub mod config;
mod orchestrator;
mod types;

pub use config::{MasterConfig, ReductionConfig};
pub use orchestrator::{load_master, run_reduction, run_reduction_reported};
pub use types::{
    FilterSummary, MasterSource, NoOpReporter, ProgressReporter, ReductionStage, ReductionSummary,
};
