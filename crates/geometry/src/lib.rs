//! Posture Geometry
//!
//! Pure functions turning keypoint pairs into a scalar posture metric, the
//! two interchangeable measurement strategies, and sample statistics used by
//! calibration and session aggregation.

mod statistics;
mod strategy;

pub use statistics::SampleStats;
pub use strategy::MetricStrategy;

use pose_source::Point;

/// Forward tilt of `upper` relative to the vertical line through `lower`,
/// in degrees.
///
/// Independent of absolute screen position: 0 when `upper` is directly above
/// `lower`, always non-negative. Screen coordinates grow downward, hence the
/// negated Y difference.
pub fn neck_tilt_degrees(upper: Point, lower: Point) -> f64 {
    let dx = upper.x - lower.x;
    let dy = -(upper.y - lower.y);
    dx.atan2(dy).abs().to_degrees()
}

/// Vertical nose-to-shoulder distance in pixels.
///
/// Positive when the nose sits above the shoulder line (upright posture);
/// shrinks as the head droops forward.
pub fn nose_to_shoulder_distance(nose: Point, shoulder_center: Point) -> f64 {
    shoulder_center.y - nose.y
}

/// Midpoint of the detected shoulders.
///
/// Averages when both shoulders are present; falls back to the single
/// detected shoulder; `None` when neither is detected.
pub fn shoulder_center(left: Option<Point>, right: Option<Point>) -> Option<Point> {
    match (left, right) {
        (Some(l), Some(r)) => Some(Point::new((l.x + r.x) / 2.0, (l.y + r.y) / 2.0)),
        (Some(l), None) => Some(l),
        (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}
