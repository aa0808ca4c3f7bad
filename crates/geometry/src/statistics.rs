//! Sample statistics for calibration and session aggregation

/// Summary statistics over a sample buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleStats {
    /// Mean value
    pub mean: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Spread (max - min)
    pub spread: f64,
}

impl SampleStats {
    /// Compute statistics from a slice of values.
    ///
    /// Returns the zeroed default for an empty slice so callers never see
    /// NaN from a 0/0 mean.
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        Self {
            mean,
            min,
            max,
            spread: max - min,
        }
    }
}
