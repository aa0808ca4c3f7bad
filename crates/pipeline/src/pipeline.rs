//! Pipeline Implementation

use crate::{PipelineConfig, PipelineError};
use alerting::AlertDebouncer;
use calibration::{CalibrationEngine, CalibrationOutcome, KeyValueStore};
use monitoring::{SessionMonitor, SessionStats};
use pose_source::{Pose, PoseError, PoseSource};
use posture::{PostureAnalyzer, PostureState};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Orchestrates the posture-signal pipeline over a pose source.
///
/// Owns every core component and drives them from the detection loop. At
/// most one pose inference is in flight at a time; each tick flows strictly
/// metric -> level -> alert check, with the latest state stashed for the
/// sample-cadence recorder.
pub struct PosturePipeline<S: PoseSource, K: KeyValueStore> {
    source: S,
    analyzer: PostureAnalyzer,
    calibration: CalibrationEngine<K>,
    debouncer: AlertDebouncer,
    monitor: SessionMonitor,
    config: PipelineConfig,
    last_state: Arc<Mutex<Option<PostureState>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl<S: PoseSource, K: KeyValueStore> PosturePipeline<S, K> {
    pub fn new(source: S, store: K, config: PipelineConfig) -> Self {
        let analyzer = PostureAnalyzer::new(config.strategy);
        let calibration = CalibrationEngine::new(store, config.strategy);
        let debouncer = AlertDebouncer::new(config.alert_threshold);
        let monitor = SessionMonitor::new(config.monitor_config());
        let last_state: Arc<Mutex<Option<PostureState>>> = Arc::new(Mutex::new(None));
        let (shutdown_tx, _) = watch::channel(false);

        // Sample cadence: push the latest analyzed state into the session
        // history
        let recorder = monitor.recorder();
        let latest = last_state.clone();
        monitor.on_sample(move || {
            if let Ok(guard) = latest.lock() {
                if let Some(state) = *guard {
                    recorder.record(state);
                }
            }
        });

        Self {
            source,
            analyzer,
            calibration,
            debouncer,
            monitor,
            config,
            last_state,
            shutdown_tx,
        }
    }

    /// Register the alert-triggered callback
    pub fn on_alert(&mut self, callback: impl FnMut() + Send + 'static) {
        self.debouncer.on_trigger(callback);
    }

    /// Register the alert-dismissed callback
    pub fn on_alert_dismiss(&mut self, callback: impl FnMut() + Send + 'static) {
        self.debouncer.on_dismiss(callback);
    }

    /// Register the session-completion callback
    pub fn on_session_complete(&self, callback: impl FnMut(SessionStats) + Send + 'static) {
        self.monitor.on_session_complete(callback);
    }

    /// Manually dismiss an active alert
    pub fn dismiss_alert(&mut self) {
        self.debouncer.dismiss();
    }

    pub fn set_alert_threshold(&mut self, threshold: u32) {
        self.debouncer.set_threshold(threshold);
    }

    pub fn calibration(&self) -> &CalibrationEngine<K> {
        &self.calibration
    }

    /// Drop the stored baseline and persisted calibration record
    pub fn reset_calibration(&mut self) {
        self.calibration.reset();
    }

    pub fn monitor(&self) -> &SessionMonitor {
        &self.monitor
    }

    pub fn is_alert_active(&self) -> bool {
        self.debouncer.is_active()
    }

    /// Most recent analyzed posture state, if any
    pub fn last_state(&self) -> Option<PostureState> {
        self.last_state.lock().ok().and_then(|guard| *guard)
    }

    /// Handle that stops the pipeline from another task
    pub fn shutdown_trigger(&self) -> watch::Sender<bool> {
        self.shutdown_tx.clone()
    }

    /// Signal the calibration and detection loops to stop
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Run the pipeline to completion: calibrate, then monitor until the
    /// source closes or shutdown is signaled.
    pub async fn run(&mut self) -> Result<(), PipelineError> {
        match self.run_calibration().await? {
            None => {
                info!("shutdown during calibration");
                return Ok(());
            }
            Some(outcome) => {
                debug!("calibration finished: {:?}", outcome);
            }
        }

        self.monitor.start();
        let result = self.run_detection_loop().await;
        self.monitor.stop();
        result
    }

    /// Calibration routine: collect a sample set, finish with the stability
    /// check, and retry the sampling phase on an unstable spread. Once the
    /// retry budget is spent, one final sample set is accepted best-effort
    /// (unchecked) so a fidgety subject still gets a session.
    ///
    /// Returns `None` when shutdown was signaled mid-calibration.
    pub async fn run_calibration(&mut self) -> Result<Option<CalibrationOutcome>, PipelineError> {
        let mut shutdown = self.shutdown_tx.subscribe();

        for attempt in 1..=self.config.max_calibration_retries {
            if !self.collect_samples(&mut shutdown).await? {
                return Ok(None);
            }
            match self.calibration.finish_calibration() {
                CalibrationOutcome::Unstable { spread } => {
                    warn!(
                        "calibration attempt {} unstable (spread {:.1}), retrying",
                        attempt, spread
                    );
                }
                outcome => return Ok(Some(outcome)),
            }
        }

        // Retry budget exhausted: best-effort baseline over one final set
        if !self.collect_samples(&mut shutdown).await? {
            return Ok(None);
        }
        Ok(Some(self.calibration.finish_calibration_unchecked()))
    }

    /// Collect one calibration sample set, spaced by the configured
    /// interval. Returns false when shutdown was signaled.
    async fn collect_samples(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<bool, PipelineError> {
        self.calibration.clear_samples();

        while self.calibration.sample_count() < self.config.target_calibration_samples {
            if *shutdown.borrow() {
                return Ok(false);
            }

            match self.source.detect().await {
                Ok(poses) => {
                    if let Some(pose) = poses.first() {
                        if !self.analyzer.has_subject(pose) {
                            debug!("subject not fully framed, skipping sample");
                        } else if let Some(raw) = self.analyzer.strategy().measure(pose) {
                            self.calibration.add_sample(raw);
                            debug!(
                                "calibration sample {}/{}",
                                self.calibration.sample_count(),
                                self.config.target_calibration_samples
                            );
                        }
                    }
                }
                Err(PoseError::Closed) => return Err(PoseError::Closed.into()),
                Err(e) => warn!("detection failed during calibration: {}", e),
            }

            if self.calibration.sample_count() >= self.config.target_calibration_samples {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => return Ok(false),
                _ = tokio::time::sleep(self.config.sample_spacing()) => {}
            }
        }

        Ok(true)
    }

    /// Detection loop: one inference in flight at a time, rescheduled only
    /// after the current one resolves. Exits on source close or shutdown.
    async fn run_detection_loop(&mut self) -> Result<(), PipelineError> {
        let mut shutdown = self.shutdown_tx.subscribe();

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => break,
                detected = self.source.detect() => match detected {
                    Ok(poses) => self.process_tick(poses.first()),
                    Err(PoseError::Closed) => {
                        debug!("pose source closed, stopping detection");
                        break;
                    }
                    Err(e) => warn!("detection failed: {}", e),
                },
            }
        }

        Ok(())
    }

    /// One detection tick: analyze, classify, feed the debouncer, stash the
    /// latest state for the sampler.
    fn process_tick(&mut self, pose: Option<&Pose>) {
        let Some(pose) = pose else {
            debug!("no pose in frame");
            return;
        };

        if !self.analyzer.has_subject(pose) {
            debug!("subject not fully framed");
            return;
        }

        let Some(state) = self.analyzer.analyze(pose, &self.calibration) else {
            return;
        };

        self.debouncer.check_posture(state.level);

        if let Ok(mut latest) = self.last_state.lock() {
            *latest = Some(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibration::MemoryStore;
    use pose_source::{Keypoint, KeypointName, ScriptedSource};
    use posture::PostureLevel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Frontal pose with a given nose-to-shoulder distance
    fn pose_with_distance(distance: f64) -> Pose {
        Pose::new(vec![
            Keypoint::scored(KeypointName::Nose, 100.0, 160.0 - distance, 0.9),
            Keypoint::scored(KeypointName::LeftShoulder, 80.0, 160.0, 0.9),
            Keypoint::scored(KeypointName::RightShoulder, 120.0, 160.0, 0.9),
        ])
    }

    fn pipeline_over(
        frames: Vec<Pose>,
    ) -> PosturePipeline<ScriptedSource, MemoryStore> {
        let source = ScriptedSource::single_pose_frames(frames);
        PosturePipeline::new(source, MemoryStore::new(), PipelineConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_calibration_establishes_baseline() {
        let frames = vec![pose_with_distance(100.0); 5];
        let mut pipeline = pipeline_over(frames);

        let outcome = pipeline.run_calibration().await.unwrap().unwrap();
        assert_eq!(outcome, CalibrationOutcome::Calibrated { baseline: 100.0 });
        assert!(pipeline.calibration().is_calibrated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_calibration_retries_after_unstable_set() {
        // First set spreads 100px (unstable), second holds still
        let mut frames: Vec<Pose> = [100.0, 150.0, 200.0, 100.0, 100.0]
            .iter()
            .map(|&d| pose_with_distance(d))
            .collect();
        frames.extend(vec![pose_with_distance(98.0); 5]);
        let mut pipeline = pipeline_over(frames);

        let outcome = pipeline.run_calibration().await.unwrap().unwrap();
        assert_eq!(outcome, CalibrationOutcome::Calibrated { baseline: 98.0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_calibration_best_effort_after_retry_budget() {
        // Every sample set is unstable; the final one is accepted unchecked
        let unstable_set = [100.0, 150.0, 200.0, 100.0, 100.0];
        let frames: Vec<Pose> = unstable_set
            .iter()
            .cycle()
            .take(15)
            .map(|&d| pose_with_distance(d))
            .collect();
        let mut pipeline = pipeline_over(frames);

        let outcome = pipeline.run_calibration().await.unwrap().unwrap();
        assert_eq!(outcome, CalibrationOutcome::Calibrated { baseline: 130.0 });
        assert!(pipeline.calibration().is_calibrated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_calibration_skips_subjectless_frames() {
        let mut frames = vec![Pose::default(), Pose::default()];
        frames.extend(vec![pose_with_distance(100.0); 5]);
        let mut pipeline = pipeline_over(frames);

        let outcome = pipeline.run_calibration().await.unwrap().unwrap();
        assert_eq!(outcome, CalibrationOutcome::Calibrated { baseline: 100.0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_alert_after_consecutive_danger() {
        // 5 calibration frames at 100px, then a sustained 50px drop
        let mut frames = vec![pose_with_distance(100.0); 5];
        frames.extend(vec![pose_with_distance(50.0); 4]);
        let mut pipeline = pipeline_over(frames);

        let triggers = Arc::new(AtomicUsize::new(0));
        let t = triggers.clone();
        pipeline.on_alert(move || {
            t.fetch_add(1, Ordering::SeqCst);
        });

        pipeline.run().await.unwrap();

        assert_eq!(triggers.load(Ordering::SeqCst), 1);
        let last = pipeline.last_state().unwrap();
        assert_eq!(last.level, PostureLevel::Danger);
        assert_eq!(last.reference_delta, 50.0);
        assert!(!pipeline.monitor().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_dismisses_alert() {
        let mut frames = vec![pose_with_distance(100.0); 5];
        frames.extend(vec![pose_with_distance(50.0); 3]);
        frames.push(pose_with_distance(100.0));
        let mut pipeline = pipeline_over(frames);

        let dismissals = Arc::new(AtomicUsize::new(0));
        let d = dismissals.clone();
        pipeline.on_alert_dismiss(move || {
            d.fetch_add(1, Ordering::SeqCst);
        });

        pipeline.run().await.unwrap();

        assert_eq!(dismissals.load(Ordering::SeqCst), 1);
        assert!(!pipeline.is_alert_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_calibration() {
        // Subject never framed: calibration would poll indefinitely
        let frames = vec![Pose::default(); 1000];
        let mut pipeline = pipeline_over(frames);
        let trigger = pipeline.shutdown_trigger();

        let handle = tokio::spawn(async move {
            let result = pipeline.run().await;
            (pipeline, result)
        });
        tokio::task::yield_now().await;
        let _ = trigger.send(true);

        let (pipeline, result) = handle.await.unwrap();
        result.unwrap();
        assert!(!pipeline.calibration().is_calibrated());
        assert!(!pipeline.monitor().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_after_shutdown_returns_immediately() {
        let mut pipeline = pipeline_over(vec![pose_with_distance(100.0); 5]);
        pipeline.shutdown();

        pipeline.run().await.unwrap();
        assert!(!pipeline.calibration().is_calibrated());
        assert_eq!(pipeline.monitor().history().len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_close_during_calibration_is_an_error() {
        let frames = vec![pose_with_distance(100.0); 2];
        let mut pipeline = pipeline_over(frames);

        let result = pipeline.run_calibration().await;
        assert!(matches!(result, Err(PipelineError::Pose(PoseError::Closed))));
    }
}
