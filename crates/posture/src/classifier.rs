//! Severity classification over the adjusted deviation

use crate::PostureLevel;
use geometry::MetricStrategy;

/// Classify an absolute deviation against the strategy's breakpoints.
///
/// Promotion to the next tier is strict greater-than: a deviation exactly at
/// a breakpoint belongs to the lower tier.
pub fn classify(deviation_abs: f64, strategy: MetricStrategy) -> PostureLevel {
    if deviation_abs > strategy.danger_breakpoint() {
        PostureLevel::Danger
    } else if deviation_abs > strategy.warning_breakpoint() {
        PostureLevel::Warning
    } else {
        PostureLevel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_angle_boundaries() {
        let s = MetricStrategy::Angle;
        assert_eq!(classify(15.0, s), PostureLevel::Normal);
        assert_eq!(classify(15.0001, s), PostureLevel::Warning);
        assert_eq!(classify(25.0, s), PostureLevel::Warning);
        assert_eq!(classify(25.0001, s), PostureLevel::Danger);
    }

    #[test]
    fn test_distance_boundaries() {
        let s = MetricStrategy::Distance;
        assert_eq!(classify(20.0, s), PostureLevel::Normal);
        assert_eq!(classify(20.5, s), PostureLevel::Warning);
        assert_eq!(classify(40.0, s), PostureLevel::Warning);
        assert_eq!(classify(40.5, s), PostureLevel::Danger);
    }

    #[test]
    fn test_zero_deviation_is_normal() {
        assert_eq!(classify(0.0, MetricStrategy::Angle), PostureLevel::Normal);
        assert_eq!(classify(0.0, MetricStrategy::Distance), PostureLevel::Normal);
    }

    proptest! {
        #[test]
        fn prop_classification_monotonic(a in 0.0f64..200.0, b in 0.0f64..200.0) {
            let s = MetricStrategy::Distance;
            if a <= b {
                prop_assert!(classify(a, s) <= classify(b, s));
            }
        }

        #[test]
        fn prop_tiers_partition_the_axis(d in 0.0f64..200.0) {
            let s = MetricStrategy::Angle;
            let level = classify(d, s);
            match level {
                PostureLevel::Normal => prop_assert!(d <= s.warning_breakpoint()),
                PostureLevel::Warning => {
                    prop_assert!(d > s.warning_breakpoint() && d <= s.danger_breakpoint())
                }
                PostureLevel::Danger => prop_assert!(d > s.danger_breakpoint()),
            }
        }
    }
}
