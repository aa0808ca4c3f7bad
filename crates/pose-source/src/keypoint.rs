//! Keypoint data model and confidence-filtered lookup

use serde::{Deserialize, Serialize};

/// Minimum confidence score for a keypoint to be usable
pub const MIN_KEYPOINT_SCORE: f64 = 0.3;

/// A 2D point in video-frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Keypoint vocabulary (MoveNet upper-body subset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
}

/// A named keypoint with an optional confidence score
///
/// An absent score means the source does not report confidence and the
/// keypoint is treated as fully confident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: KeypointName,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Keypoint {
    /// Create a keypoint with a confidence score
    pub fn scored(name: KeypointName, x: f64, y: f64, score: f64) -> Self {
        Self {
            name,
            x,
            y,
            score: Some(score),
        }
    }

    /// Create a keypoint without a confidence score
    pub fn unscored(name: KeypointName, x: f64, y: f64) -> Self {
        Self {
            name,
            x,
            y,
            score: None,
        }
    }
}

/// A single detected pose: a set of named keypoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    /// Look up a named keypoint, filtered by confidence.
    ///
    /// Returns `None` when the keypoint is absent from the pose or its score
    /// is strictly below [`MIN_KEYPOINT_SCORE`]. A keypoint without a score
    /// passes the filter.
    pub fn keypoint(&self, name: KeypointName) -> Option<Point> {
        let kp = self.keypoints.iter().find(|kp| kp.name == name)?;

        if let Some(score) = kp.score {
            if score < MIN_KEYPOINT_SCORE {
                return None;
            }
        }

        Some(Point::new(kp.x, kp.y))
    }

    /// Nose coordinates
    pub fn nose(&self) -> Option<Point> {
        self.keypoint(KeypointName::Nose)
    }

    /// Left eye coordinates
    pub fn left_eye(&self) -> Option<Point> {
        self.keypoint(KeypointName::LeftEye)
    }

    /// Right eye coordinates
    pub fn right_eye(&self) -> Option<Point> {
        self.keypoint(KeypointName::RightEye)
    }

    /// Left ear coordinates
    pub fn left_ear(&self) -> Option<Point> {
        self.keypoint(KeypointName::LeftEar)
    }

    /// Right ear coordinates
    pub fn right_ear(&self) -> Option<Point> {
        self.keypoint(KeypointName::RightEar)
    }

    /// Left shoulder coordinates
    pub fn left_shoulder(&self) -> Option<Point> {
        self.keypoint(KeypointName::LeftShoulder)
    }

    /// Right shoulder coordinates
    pub fn right_shoulder(&self) -> Option<Point> {
        self.keypoint(KeypointName::RightShoulder)
    }
}
