//! Alert Debouncer Implementation

use posture::PostureLevel;
use tracing::{debug, info};

/// Default consecutive-danger ticks before an alert fires
pub const DEFAULT_ALERT_THRESHOLD: u32 = 3;

type Callback = Box<dyn FnMut() + Send>;

/// Consecutive-danger alert state machine.
///
/// Idle (count 0) → accumulating (count below threshold) → active. The
/// trigger callback fires exactly once per danger streak when the count
/// crosses the threshold; any non-danger tick resets the streak and, when an
/// alert was active, fires the dismiss callback exactly once.
pub struct AlertDebouncer {
    consecutive_danger: u32,
    active: bool,
    threshold: u32,
    on_trigger: Option<Callback>,
    on_dismiss: Option<Callback>,
}

impl AlertDebouncer {
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive_danger: 0,
            active: false,
            threshold: threshold.max(1),
            on_trigger: None,
            on_dismiss: None,
        }
    }

    /// Register the alert-triggered callback, replacing any prior one
    pub fn on_trigger(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_trigger = Some(Box::new(callback));
    }

    /// Register the alert-dismissed callback, replacing any prior one
    pub fn on_dismiss(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_dismiss = Some(Box::new(callback));
    }

    pub fn consecutive_danger_count(&self) -> u32 {
        self.consecutive_danger
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Change the promotion bound for future evaluations.
    ///
    /// The current streak is not re-evaluated; activation only ever happens
    /// on a danger tick.
    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold.max(1);
    }

    /// Feed one classified tick into the state machine
    pub fn check_posture(&mut self, level: PostureLevel) {
        if level == PostureLevel::Danger {
            self.consecutive_danger += 1;

            if self.consecutive_danger >= self.threshold && !self.active {
                self.active = true;
                info!(
                    "alert triggered after {} consecutive danger ticks",
                    self.consecutive_danger
                );
                if let Some(cb) = self.on_trigger.as_mut() {
                    cb();
                }
            }
        } else {
            let was_active = self.active;
            self.consecutive_danger = 0;
            self.active = false;

            if was_active {
                debug!("alert dismissed by posture recovery");
                if let Some(cb) = self.on_dismiss.as_mut() {
                    cb();
                }
            }
        }
    }

    /// Manual dismissal: back to idle without firing the dismiss callback
    /// (the caller initiated it, no event to report back).
    pub fn dismiss(&mut self) {
        self.active = false;
        self.consecutive_danger = 0;
    }
}

impl Default for AlertDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_THRESHOLD)
    }
}
