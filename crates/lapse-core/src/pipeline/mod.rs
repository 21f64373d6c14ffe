pub mod config;
mod types;

pub use config::LapseConfig;
pub use types::{CancelToken, NoOpReporter, PipelineStage, ProgressReporter};
