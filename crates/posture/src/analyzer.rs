//! Per-tick posture analysis

use crate::{classify, PostureState};
use calibration::{CalibrationEngine, KeyValueStore};
use geometry::MetricStrategy;
use pose_source::Pose;
use tracing::trace;

/// Combines keypoint access, geometry, and calibration into one per-tick
/// analysis step.
#[derive(Debug, Clone, Copy)]
pub struct PostureAnalyzer {
    strategy: MetricStrategy,
}

impl PostureAnalyzer {
    pub fn new(strategy: MetricStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> MetricStrategy {
        self.strategy
    }

    /// Whether the subject is framed well enough to analyze: nose plus at
    /// least one shoulder. Used for camera-adjustment feedback; measurement
    /// itself re-checks the keypoints it needs.
    pub fn has_subject(&self, pose: &Pose) -> bool {
        pose.nose().is_some()
            && (pose.left_shoulder().is_some() || pose.right_shoulder().is_some())
    }

    /// Analyze one pose into a posture state.
    ///
    /// `None` when the required keypoints are not detected. Classification
    /// runs over the absolute calibration-adjusted deviation; the signed
    /// deviation is kept on the state for the UI.
    pub fn analyze<S: KeyValueStore>(
        &self,
        pose: &Pose,
        calibration: &CalibrationEngine<S>,
    ) -> Option<PostureState> {
        let metric = self.strategy.measure(pose)?;
        let reference_delta = calibration.adjusted(metric);
        let level = classify(reference_delta.abs(), self.strategy);

        trace!(
            "analyzed posture: metric {:.1} {} delta {:.1} level {:?}",
            metric,
            self.strategy.unit(),
            reference_delta,
            level
        );

        Some(PostureState {
            level,
            metric,
            reference_delta,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        })
    }
}
