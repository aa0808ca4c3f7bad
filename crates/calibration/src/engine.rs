//! Calibration Engine Implementation

use crate::store::KeyValueStore;
use geometry::{MetricStrategy, SampleStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Fixed storage key for the persisted calibration record
pub const STORAGE_KEY: &str = "axis_calibration";

/// Persisted calibration record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalibrationRecord {
    baseline: f64,
    calibrated: bool,
}

/// Outcome of finishing a calibration attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationOutcome {
    /// Baseline established from the sample mean
    Calibrated { baseline: f64 },
    /// Samples spread too far apart; buffer cleared, sampling should be
    /// retried
    Unstable { spread: f64 },
    /// No samples were collected
    NoSamples,
}

impl CalibrationOutcome {
    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated { .. })
    }

    /// Whether the caller is expected to retry the sampling phase
    pub fn needs_retry(&self) -> bool {
        matches!(self, Self::Unstable { .. })
    }
}

/// Per-subject baseline calibration.
///
/// Owns the calibration record exclusively; all mutation goes through
/// `calibrate` / `finish_calibration` / `reset`. The record is persisted
/// under [`STORAGE_KEY`] and reloaded at construction.
pub struct CalibrationEngine<S: KeyValueStore> {
    store: S,
    strategy: MetricStrategy,
    baseline: f64,
    calibrated: bool,
    samples: Vec<f64>,
}

impl<S: KeyValueStore> CalibrationEngine<S> {
    /// Create an engine, restoring any persisted baseline.
    ///
    /// Missing or malformed persisted data falls back to the uncalibrated
    /// zero state; load failures never propagate.
    pub fn new(store: S, strategy: MetricStrategy) -> Self {
        let mut engine = Self {
            store,
            strategy,
            baseline: 0.0,
            calibrated: false,
            samples: Vec::new(),
        };
        engine.load();
        engine
    }

    fn load(&mut self) {
        let Some(raw) = self.store.get(STORAGE_KEY) else {
            return;
        };
        match serde_json::from_str::<CalibrationRecord>(&raw) {
            Ok(record) => {
                self.baseline = record.baseline;
                self.calibrated = record.calibrated;
                debug!(
                    "restored calibration: baseline {:.1} {} (calibrated: {})",
                    record.baseline,
                    self.strategy.unit(),
                    record.calibrated
                );
            }
            Err(e) => {
                // Stale or corrupt record: start uncalibrated
                warn!("discarding malformed calibration record: {}", e);
            }
        }
    }

    fn persist(&mut self) {
        let record = CalibrationRecord {
            baseline: self.baseline,
            calibrated: self.calibrated,
        };
        match serde_json::to_string(&record) {
            Ok(json) => self.store.set(STORAGE_KEY, &json),
            Err(e) => warn!("failed to encode calibration record: {}", e),
        }
    }

    /// Measurement strategy this engine calibrates for
    pub fn strategy(&self) -> MetricStrategy {
        self.strategy
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Append a raw metric sample to the in-memory buffer
    pub fn add_sample(&mut self, value: f64) {
        self.samples.push(value);
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Empty the sample buffer without touching the persisted baseline
    pub fn clear_samples(&mut self) {
        self.samples.clear();
    }

    /// Set the baseline directly, mark calibrated, and persist
    pub fn calibrate(&mut self, value: f64) {
        self.baseline = value;
        self.calibrated = true;
        self.persist();
        info!(
            "calibrated: baseline {:.1} {}",
            value,
            self.strategy.unit()
        );
    }

    /// Finish calibration from the collected samples.
    ///
    /// Fails with `Unstable` (clearing the buffer) when the sample spread
    /// exceeds the strategy's stability threshold; the subject likely moved
    /// during sampling. Otherwise the baseline is the sample mean.
    pub fn finish_calibration(&mut self) -> CalibrationOutcome {
        self.finish_with_stability_check(true)
    }

    /// Finish calibration without the stability check.
    ///
    /// Best-effort path for callers that exhausted their retry budget and
    /// prefer an unstabilized baseline over staying uncalibrated.
    pub fn finish_calibration_unchecked(&mut self) -> CalibrationOutcome {
        self.finish_with_stability_check(false)
    }

    fn finish_with_stability_check(&mut self, check_stability: bool) -> CalibrationOutcome {
        if self.samples.is_empty() {
            return CalibrationOutcome::NoSamples;
        }

        let stats = SampleStats::compute(&self.samples);

        if check_stability && stats.spread > self.strategy.stability_threshold() {
            warn!(
                "calibration unstable: spread {:.1} {} exceeds {:.1}",
                stats.spread,
                self.strategy.unit(),
                self.strategy.stability_threshold()
            );
            self.samples.clear();
            return CalibrationOutcome::Unstable {
                spread: stats.spread,
            };
        }

        self.calibrate(stats.mean);
        self.samples.clear();
        CalibrationOutcome::Calibrated {
            baseline: stats.mean,
        }
    }

    /// Signed deviation of a raw metric from the baseline.
    ///
    /// Raw passthrough when uncalibrated; otherwise the strategy's sign rule
    /// applies (angle: `raw - baseline`; distance: `baseline - raw`).
    pub fn adjusted(&self, raw: f64) -> f64 {
        if !self.calibrated {
            return raw;
        }
        self.strategy.deviation(raw, self.baseline)
    }

    /// Drop the baseline, the sample buffer, and the persisted record
    pub fn reset(&mut self) {
        self.baseline = 0.0;
        self.calibrated = false;
        self.samples.clear();
        self.store.remove(STORAGE_KEY);
        info!("calibration reset");
    }
}
