//! Alerting System
//!
//! Converts a stream of posture levels into discrete alert-triggered and
//! alert-dismissed events via consecutive-danger debouncing.

mod debouncer;

pub use debouncer::{AlertDebouncer, DEFAULT_ALERT_THRESHOLD};
