//! Posture Pipeline Orchestrator
//!
//! Wires the core components together and drives them from a pose source:
//! camera frames -> keypoint access -> geometry -> calibration ->
//! classification -> alert debouncing and session aggregation.

mod config;
mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::PosturePipeline;

use pose_source::PoseError;
use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Pose source error: {0}")]
    Pose(#[from] PoseError),
}
