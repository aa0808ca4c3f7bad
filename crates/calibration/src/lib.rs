//! Calibration Layer
//!
//! Removes per-subject baseline variance before posture thresholding:
//! - Sample collection and stability checking
//! - Personalized baseline computation and signed deviation adjustment
//! - Persistence to an injected durable key-value store

mod engine;
mod store;

pub use engine::{CalibrationEngine, CalibrationOutcome, STORAGE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
