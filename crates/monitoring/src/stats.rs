//! Session statistics

use posture::{PostureLevel, PostureState};
use serde::{Deserialize, Serialize};

/// Per-level sample tally, zero-initialized for all levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub normal: u32,
    pub warning: u32,
    pub danger: u32,
}

impl LevelCounts {
    /// Tally the levels over a sample history
    pub fn tally(history: &[PostureState]) -> Self {
        let mut counts = Self::default();
        for sample in history {
            match sample.level {
                PostureLevel::Normal => counts.normal += 1,
                PostureLevel::Warning => counts.warning += 1,
                PostureLevel::Danger => counts.danger += 1,
            }
        }
        counts
    }

    pub fn count(&self, level: PostureLevel) -> u32 {
        match level {
            PostureLevel::Normal => self.normal,
            PostureLevel::Warning => self.warning,
            PostureLevel::Danger => self.danger,
        }
    }

    pub fn total(&self) -> u32 {
        self.normal + self.warning + self.danger
    }
}

/// Immutable session statistics snapshot, computed on demand from the
/// history buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Mean of the per-sample metric, 0 when no samples were recorded
    pub average_metric: f64,
    /// Per-level sample tally
    pub level_counts: LevelCounts,
    /// Wall time the session has been running, in milliseconds
    pub total_duration_ms: i64,
    /// Rounded percentage of normal-level samples, 0 when empty
    pub good_posture_ratio: u32,
    /// Number of recorded samples
    pub total_samples: usize,
    /// Session start, Unix epoch milliseconds
    pub start_time_ms: i64,
    /// Snapshot time, Unix epoch milliseconds
    pub end_time_ms: i64,
}
