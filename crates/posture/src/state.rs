//! Posture state model

use serde::{Deserialize, Serialize};

/// Posture severity level, ordered by severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PostureLevel {
    #[default]
    Normal,
    Warning,
    Danger,
}

/// Per-tick posture analysis result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureState {
    /// Classified severity level
    pub level: PostureLevel,

    /// Raw geometric measurement (degrees or pixels, by strategy)
    pub metric: f64,

    /// Calibration-adjusted deviation used for classification
    pub reference_delta: f64,

    /// Unix epoch milliseconds at analysis time
    pub timestamp_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_severity_ordering() {
        assert!(PostureLevel::Normal < PostureLevel::Warning);
        assert!(PostureLevel::Warning < PostureLevel::Danger);
    }

    #[test]
    fn test_level_wire_format() {
        assert_eq!(
            serde_json::to_string(&PostureLevel::Danger).unwrap(),
            "\"danger\""
        );
    }
}
