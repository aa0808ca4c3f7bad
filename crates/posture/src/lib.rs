//! Posture Classification
//!
//! Turns a detected pose into a leveled posture state:
//! - Severity levels (normal / warning / danger)
//! - Strict-breakpoint classification over the calibration-adjusted deviation
//! - Per-tick analysis combining keypoint access, geometry, and calibration

mod analyzer;
mod classifier;
mod state;

pub use analyzer::PostureAnalyzer;
pub use classifier::classify;
pub use state::{PostureLevel, PostureState};
