//! Session Monitor Implementation

use crate::{LevelCounts, SessionStats};
use posture::{PostureLevel, PostureState};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info};

/// Monitor timing configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Sample-callback cadence
    pub sample_interval: Duration,
    /// Fixed session window length
    pub session_duration: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(10_000),
            session_duration: Duration::from_millis(60_000),
        }
    }
}

type SampleCallback = Box<dyn FnMut() + Send>;
type SessionCallback = Box<dyn FnMut(SessionStats) + Send>;

#[derive(Default)]
struct Callbacks {
    on_sample: Option<SampleCallback>,
    on_session_complete: Option<SessionCallback>,
}

struct MonitorState {
    running: bool,
    history: Vec<PostureState>,
    start_time_ms: i64,
}

#[derive(Default)]
struct Tasks {
    sample: Option<JoinHandle<()>>,
    session: Option<JoinHandle<()>>,
}

/// Timer-driven session aggregator.
///
/// `start` arms a repeating sample timer and a one-shot session timer; the
/// session timer completes the session exactly once (stats snapshot →
/// completion callback → history cleared → stopped). `stop` disarms both
/// timers before returning and is safe to call repeatedly.
pub struct SessionMonitor {
    config: MonitorConfig,
    state: Arc<Mutex<MonitorState>>,
    callbacks: Arc<Mutex<Callbacks>>,
    tasks: Mutex<Tasks>,
}

impl SessionMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MonitorState {
                running: false,
                history: Vec::new(),
                start_time_ms: 0,
            })),
            callbacks: Arc::new(Mutex::new(Callbacks::default())),
            tasks: Mutex::new(Tasks::default()),
        }
    }

    /// Register the per-sample callback, replacing any prior one
    pub fn on_sample(&self, callback: impl FnMut() + Send + 'static) {
        if let Ok(mut cbs) = self.callbacks.lock() {
            cbs.on_sample = Some(Box::new(callback));
        }
    }

    /// Register the session-completion callback, replacing any prior one
    pub fn on_session_complete(&self, callback: impl FnMut(SessionStats) + Send + 'static) {
        if let Ok(mut cbs) = self.callbacks.lock() {
            cbs.on_session_complete = Some(Box::new(callback));
        }
    }

    /// Cheap handle for pushing samples into the history buffer, usable from
    /// inside the sample callback
    pub fn recorder(&self) -> SessionRecorder {
        SessionRecorder {
            state: self.state.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().map(|s| s.running).unwrap_or(false)
    }

    /// Start a session: record the start time and arm both timers.
    ///
    /// No-op when already running.
    pub fn start(&self) {
        {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            if state.running {
                debug!("monitor already running");
                return;
            }
            state.running = true;
            state.start_time_ms = now_ms();
        }

        info!(
            "monitoring started: sampling every {:?}, session {:?}",
            self.config.sample_interval, self.config.session_duration
        );

        let sample = tokio::spawn(sample_loop(
            self.state.clone(),
            self.callbacks.clone(),
            self.config.sample_interval,
        ));
        let session = tokio::spawn(session_loop(
            self.state.clone(),
            self.callbacks.clone(),
            self.config.session_duration,
        ));

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.sample = Some(sample);
            tasks.session = Some(session);
        }
    }

    /// Stop the session and disarm both timers. Idempotent; no callback
    /// fires after this returns.
    pub fn stop(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.running = false;
        }
        if let Ok(mut tasks) = self.tasks.lock() {
            if let Some(task) = tasks.sample.take() {
                task.abort();
            }
            if let Some(task) = tasks.session.take() {
                task.abort();
            }
        }
        debug!("monitoring stopped");
    }

    /// Append a sample to the history buffer.
    ///
    /// Valid in either run state; a stopped monitor still accepts manual
    /// recordings.
    pub fn record_posture(&self, sample: PostureState) {
        if let Ok(mut state) = self.state.lock() {
            state.history.push(sample);
        }
    }

    /// Owned copy of the history buffer
    pub fn history(&self) -> Vec<PostureState> {
        self.state
            .lock()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    pub fn clear_history(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.history.clear();
        }
    }

    /// Mean of the recorded metrics, 0 when the buffer is empty
    pub fn average_metric(&self) -> f64 {
        self.state
            .lock()
            .map(|s| average_metric(&s.history))
            .unwrap_or(0.0)
    }

    /// Per-level tally over the buffer
    pub fn level_counts(&self) -> LevelCounts {
        self.state
            .lock()
            .map(|s| LevelCounts::tally(&s.history))
            .unwrap_or_default()
    }

    /// Rounded percentage of normal-level samples, 0 when empty
    pub fn good_posture_ratio(&self) -> u32 {
        self.state
            .lock()
            .map(|s| good_posture_ratio(&s.history))
            .unwrap_or(0)
    }

    /// Wall time since the session started, in milliseconds
    pub fn total_duration_ms(&self) -> i64 {
        self.state
            .lock()
            .map(|s| now_ms() - s.start_time_ms)
            .unwrap_or(0)
    }

    /// Full statistics snapshot over the current buffer
    pub fn session_stats(&self) -> SessionStats {
        match self.state.lock() {
            Ok(state) => compute_stats(&state),
            Err(poisoned) => compute_stats(&poisoned.into_inner()),
        }
    }
}

impl Default for SessionMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

/// Handle for recording samples into a monitor's history buffer
#[derive(Clone)]
pub struct SessionRecorder {
    state: Arc<Mutex<MonitorState>>,
}

impl SessionRecorder {
    pub fn record(&self, sample: PostureState) {
        if let Ok(mut state) = self.state.lock() {
            state.history.push(sample);
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn average_metric(history: &[PostureState]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    history.iter().map(|s| s.metric).sum::<f64>() / history.len() as f64
}

fn good_posture_ratio(history: &[PostureState]) -> u32 {
    if history.is_empty() {
        return 0;
    }
    let normal = history
        .iter()
        .filter(|s| s.level == PostureLevel::Normal)
        .count();
    (normal as f64 / history.len() as f64 * 100.0).round() as u32
}

fn compute_stats(state: &MonitorState) -> SessionStats {
    let end_time_ms = now_ms();
    SessionStats {
        average_metric: average_metric(&state.history),
        level_counts: LevelCounts::tally(&state.history),
        total_duration_ms: end_time_ms - state.start_time_ms,
        good_posture_ratio: good_posture_ratio(&state.history),
        total_samples: state.history.len(),
        start_time_ms: state.start_time_ms,
        end_time_ms,
    }
}

/// Repeating sample timer: fires the sample callback once per interval while
/// the monitor is running. First firing comes after one full interval.
async fn sample_loop(
    state: Arc<Mutex<MonitorState>>,
    callbacks: Arc<Mutex<Callbacks>>,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;

        let running = state.lock().map(|s| s.running).unwrap_or(false);
        if !running {
            break;
        }

        if let Ok(mut cbs) = callbacks.lock() {
            if let Some(cb) = cbs.on_sample.as_mut() {
                cb();
            }
        }
    }
}

/// One-shot session timer: completes the session after the configured
/// duration. Completion order follows the snapshot contract: stats are
/// computed first, then the callback fires, then history clears and the
/// monitor stops.
async fn session_loop(
    state: Arc<Mutex<MonitorState>>,
    callbacks: Arc<Mutex<Callbacks>>,
    duration: Duration,
) {
    sleep(duration).await;

    let stats = {
        let Ok(st) = state.lock() else { return };
        if !st.running {
            return;
        }
        compute_stats(&st)
    };

    info!(
        "session complete: {} samples, {}% good posture",
        stats.total_samples, stats.good_posture_ratio
    );

    if let Ok(mut cbs) = callbacks.lock() {
        if let Some(cb) = cbs.on_session_complete.as_mut() {
            cb(stats);
        }
    }

    if let Ok(mut st) = state.lock() {
        st.history.clear();
        st.running = false;
    }
}
