//! Pipeline configuration
//!
//! Layered loading: built-in defaults, an optional `posture` config file,
//! then `POSTURE_*` environment overrides.

use ::config::{Config, ConfigError, Environment, File};
use geometry::MetricStrategy;
use monitoring::MonitorConfig;
use serde::Deserialize;
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Posture measurement strategy
    pub strategy: MetricStrategy,

    /// Baseline samples collected per calibration attempt
    pub target_calibration_samples: usize,

    /// Spacing between calibration sampling attempts (milliseconds)
    pub calibration_sample_spacing_ms: u64,

    /// Stability-failed sampling retries before falling back to a
    /// best-effort baseline
    pub max_calibration_retries: u32,

    /// Consecutive danger ticks before an alert fires
    pub alert_threshold: u32,

    /// Sample-recording cadence (milliseconds)
    pub sample_interval_ms: u64,

    /// Session window length (milliseconds)
    pub session_duration_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategy: MetricStrategy::default(),
            target_calibration_samples: 5,
            calibration_sample_spacing_ms: 400,
            max_calibration_retries: 2,
            alert_threshold: 3,
            sample_interval_ms: 10_000,
            session_duration_ms: 60_000,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from the layered sources
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("posture").required(false))
            .add_source(Environment::with_prefix("POSTURE").try_parsing(true))
            .build()?;

        settings.try_deserialize()
    }

    /// Monitor timing derived from this config
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            sample_interval: Duration::from_millis(self.sample_interval_ms),
            session_duration: Duration::from_millis(self.session_duration_ms),
        }
    }

    pub fn sample_spacing(&self) -> Duration {
        Duration::from_millis(self.calibration_sample_spacing_ms)
    }
}
