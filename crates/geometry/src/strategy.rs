//! Measurement strategy selection
//!
//! The system measures forward lean either as a neck tilt angle or as the
//! change in nose-to-shoulder distance. The strategy carries everything that
//! differs between the two: breakpoints, units, the calibration stability
//! bound, the deviation sign rule, and how a metric is extracted from a pose.

use crate::{neck_tilt_degrees, nose_to_shoulder_distance, shoulder_center};
use pose_source::Pose;
use serde::{Deserialize, Serialize};

/// Posture metric strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStrategy {
    /// Forward tilt of the ear (or nose) over the shoulder line, in degrees
    Angle,
    /// Vertical nose-to-shoulder distance, in pixels
    #[default]
    Distance,
}

impl MetricStrategy {
    /// Deviation above which posture is classified as warning
    pub fn warning_breakpoint(&self) -> f64 {
        match self {
            Self::Angle => 15.0,
            Self::Distance => 20.0,
        }
    }

    /// Deviation above which posture is classified as danger
    pub fn danger_breakpoint(&self) -> f64 {
        match self {
            Self::Angle => 25.0,
            Self::Distance => 40.0,
        }
    }

    /// Maximum sample spread accepted by calibration
    pub fn stability_threshold(&self) -> f64 {
        match self {
            Self::Angle => 5.0,
            Self::Distance => 15.0,
        }
    }

    /// Metric unit, for logs and UI
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Angle => "deg",
            Self::Distance => "px",
        }
    }

    /// Signed deviation of a raw metric from the calibrated baseline.
    ///
    /// Angle: plain difference. Distance: negated difference, so a shrinking
    /// nose-to-shoulder distance (head drooping forward) yields a positive,
    /// more-danger delta.
    pub fn deviation(&self, raw: f64, baseline: f64) -> f64 {
        match self {
            Self::Angle => raw - baseline,
            Self::Distance => -(raw - baseline),
        }
    }

    /// Extract the raw metric from a pose.
    ///
    /// `None` when a required keypoint is missing or below the confidence
    /// threshold; no substitute value is ever produced.
    pub fn measure(&self, pose: &Pose) -> Option<f64> {
        let center = shoulder_center(pose.left_shoulder(), pose.right_shoulder())?;

        match self {
            Self::Angle => {
                let upper = pose.left_ear().or_else(|| pose.right_ear()).or_else(|| pose.nose())?;
                Some(neck_tilt_degrees(upper, center))
            }
            Self::Distance => {
                let nose = pose.nose()?;
                Some(nose_to_shoulder_distance(nose, center))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_source::{Keypoint, KeypointName};

    fn upright_pose() -> Pose {
        Pose::new(vec![
            Keypoint::scored(KeypointName::Nose, 100.0, 50.0, 0.9),
            Keypoint::scored(KeypointName::LeftEar, 100.0, 60.0, 0.9),
            Keypoint::scored(KeypointName::LeftShoulder, 80.0, 150.0, 0.9),
            Keypoint::scored(KeypointName::RightShoulder, 120.0, 150.0, 0.9),
        ])
    }

    #[test]
    fn test_distance_measure() {
        let d = MetricStrategy::Distance.measure(&upright_pose()).unwrap();
        assert_eq!(d, 100.0);
    }

    #[test]
    fn test_angle_measure_upright_is_zero() {
        let a = MetricStrategy::Angle.measure(&upright_pose()).unwrap();
        assert!(a.abs() < 1e-9);
    }

    #[test]
    fn test_angle_falls_back_to_nose() {
        // No ears detected: the nose stands in as the upper point
        let pose = Pose::new(vec![
            Keypoint::scored(KeypointName::Nose, 130.0, 120.0, 0.9),
            Keypoint::scored(KeypointName::LeftShoulder, 100.0, 150.0, 0.9),
        ]);
        assert!(MetricStrategy::Angle.measure(&pose).is_some());
    }

    #[test]
    fn test_measure_undetected_without_shoulders() {
        let pose = Pose::new(vec![Keypoint::scored(KeypointName::Nose, 100.0, 50.0, 0.9)]);
        assert!(MetricStrategy::Distance.measure(&pose).is_none());
        assert!(MetricStrategy::Angle.measure(&pose).is_none());
    }

    #[test]
    fn test_distance_undetected_without_nose() {
        let pose = Pose::new(vec![
            Keypoint::scored(KeypointName::Nose, 100.0, 50.0, 0.1),
            Keypoint::scored(KeypointName::LeftShoulder, 80.0, 150.0, 0.9),
        ]);
        assert!(MetricStrategy::Distance.measure(&pose).is_none());
    }

    #[test]
    fn test_single_shoulder_used_directly() {
        let pose = Pose::new(vec![
            Keypoint::scored(KeypointName::Nose, 100.0, 50.0, 0.9),
            Keypoint::scored(KeypointName::LeftShoulder, 80.0, 150.0, 0.9),
        ]);
        assert_eq!(MetricStrategy::Distance.measure(&pose), Some(100.0));
    }

    #[test]
    fn test_deviation_sign_rules() {
        // Angle: deviation grows with the raw angle
        assert_eq!(MetricStrategy::Angle.deviation(30.0, 10.0), 20.0);
        // Distance: a shrinking distance yields a positive delta
        assert_eq!(MetricStrategy::Distance.deviation(70.0, 100.0), 30.0);
        assert_eq!(MetricStrategy::Distance.deviation(110.0, 100.0), -10.0);
    }
}
