//! Session Monitoring
//!
//! Aggregates posture samples over fixed-duration sessions:
//! - Repeating sample timer (10 s cadence) and one-shot session timer (60 s)
//! - History buffer with on-demand statistics
//! - Exactly-once session-completion callback with a stats snapshot

mod monitor;
mod stats;

pub use monitor::{MonitorConfig, SessionMonitor, SessionRecorder};
pub use stats::{LevelCounts, SessionStats};
