//! Pose-estimation capability trait and a scripted test source

use crate::{Pose, PoseError};
use std::collections::VecDeque;
use tracing::debug;

/// Asynchronous pose-estimation capability.
///
/// One `detect` call corresponds to one video frame pushed through the
/// external model. A frame may contain zero poses (nobody in view) or more
/// than one; the pipeline only consumes the first.
pub trait PoseSource {
    fn detect(&mut self) -> impl std::future::Future<Output = Result<Vec<Pose>, PoseError>> + Send;
}

/// Deterministic pose source that replays a fixed frame sequence.
///
/// Returns [`PoseError::Closed`] once the script is exhausted. Used by
/// pipeline tests in place of a live camera and model.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<Vec<Pose>>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Vec<Pose>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Script a sequence of single-pose frames
    pub fn single_pose_frames(poses: Vec<Pose>) -> Self {
        Self::new(poses.into_iter().map(|p| vec![p]).collect())
    }

    /// Append a frame to the script
    pub fn push_frame(&mut self, poses: Vec<Pose>) {
        self.frames.push_back(poses);
    }

    /// Frames remaining in the script
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl PoseSource for ScriptedSource {
    async fn detect(&mut self) -> Result<Vec<Pose>, PoseError> {
        match self.frames.pop_front() {
            Some(poses) => Ok(poses),
            None => {
                debug!("scripted source exhausted");
                Err(PoseError::Closed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Keypoint, KeypointName};

    #[tokio::test]
    async fn test_scripted_source_replays_in_order() {
        let first = Pose::new(vec![Keypoint::scored(KeypointName::Nose, 10.0, 10.0, 0.9)]);
        let second = Pose::new(vec![Keypoint::scored(KeypointName::Nose, 20.0, 20.0, 0.9)]);
        let mut source = ScriptedSource::single_pose_frames(vec![first.clone(), second.clone()]);

        assert_eq!(source.detect().await.unwrap(), vec![first]);
        assert_eq!(source.detect().await.unwrap(), vec![second]);
        assert!(matches!(source.detect().await, Err(PoseError::Closed)));
    }

    #[tokio::test]
    async fn test_empty_frame_is_not_an_error() {
        let mut source = ScriptedSource::new(vec![vec![]]);
        assert!(source.detect().await.unwrap().is_empty());
    }
}
