//! Pose Source Library
//!
//! Data model and access layer for 2D pose estimation output:
//! - Named, confidence-scored keypoints in video-frame coordinates
//! - Confidence-filtered keypoint lookup
//! - The `PoseSource` capability trait the detection pipeline is driven by

pub mod keypoint;
pub mod source;

pub use keypoint::{Keypoint, KeypointName, Point, Pose, MIN_KEYPOINT_SCORE};
pub use source::{PoseSource, ScriptedSource};

use thiserror::Error;

/// Pose source error types
#[derive(Error, Debug)]
pub enum PoseError {
    #[error("Pose source initialization failed: {0}")]
    Init(String),

    #[error("Pose inference failed: {0}")]
    Inference(String),

    #[error("Pose source closed")]
    Closed,
}
