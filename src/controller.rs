//! Pipeline controller
//!
//! Owns one user session turn of the background-removal flow: validate the
//! submitted file, hold the source reference, invoke the capability on a
//! cancellable worker task, advance simulated progress while waiting,
//! normalize the polymorphic result, and release every temporary object
//! reference exactly once when it is superseded or the controller is torn
//! down.
//!
//! State machine: `Idle -> Loading -> Idle(with result) | Idle(no result)`.
//! Only one request is in flight at a time; a newer submission aborts the
//! prior task, so a stale result can never overwrite a newer one.

use crate::capability::BackgroundRemoval;
use crate::config::{InputRejection, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::handles::{DisplayRef, ImageBlob, ObjectUrlRegistry};
use crate::outcome::RemovalOutcome;
use crate::progress::{NoOpProgressReporter, ProgressReporter, SimulatedProgress};
use crate::source::{RawFile, SourceImage};
use chrono::Utc;
use instant::{Duration, Instant};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Controller state, replaced wholesale on every transition
#[derive(Debug)]
enum PipelineState {
    /// No request in flight; either empty or holding the last run's references
    Idle {
        original: Option<DisplayRef>,
        result: Option<DisplayRef>,
    },
    /// A request is in flight for the held source reference
    Loading { original: DisplayRef },
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::Idle {
            original: None,
            result: None,
        }
    }
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Display reference for the submitted image, if any
    pub original: Option<DisplayRef>,
    /// Display reference for the processed image, if any
    pub result: Option<DisplayRef>,
    /// Whether a request is in flight
    pub loading: bool,
    /// Simulated progress percentage (0-100)
    pub progress: u8,
}

struct InFlight {
    generation: u64,
    task: JoinHandle<Result<RemovalOutcome>>,
}

/// Image background-removal pipeline controller
///
/// Exclusively owns the source and result references for the duration of one
/// session turn; hands out read-only [`ViewState`] snapshots and retains
/// release responsibility for every object URL it creates.
pub struct PipelineController {
    config: PipelineConfig,
    capability: Arc<dyn BackgroundRemoval>,
    registry: ObjectUrlRegistry,
    reporter: Arc<dyn ProgressReporter>,
    progress: SimulatedProgress,
    state: PipelineState,
    generation: u64,
    started: Option<Instant>,
    in_flight: Option<InFlight>,
}

impl PipelineController {
    /// Create a controller with default configuration and no reporter
    #[must_use]
    pub fn new(capability: Arc<dyn BackgroundRemoval>) -> Self {
        Self::with_config(capability, PipelineConfig::default())
    }

    /// Create a controller with an explicit configuration
    #[must_use]
    pub fn with_config(capability: Arc<dyn BackgroundRemoval>, config: PipelineConfig) -> Self {
        let progress = SimulatedProgress::new(config.progress_ceiling);
        Self {
            config,
            capability,
            registry: ObjectUrlRegistry::new(),
            reporter: Arc::new(NoOpProgressReporter),
            progress,
            state: PipelineState::default(),
            generation: 0,
            started: None,
            in_flight: None,
        }
    }

    /// Attach a progress reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Submit a user-selected file for background removal
    ///
    /// Non-image payloads are rejected before any state transition: silently
    /// in the [`InputRejection::Silent`] variant, as an error in the
    /// [`InputRejection::Error`] variant. A valid submission supersedes any
    /// prior one, aborting its in-flight request and releasing its
    /// references, then transitions to `Loading` and spawns the capability
    /// invocation. Must be called within a tokio runtime.
    pub fn submit(&mut self, file: RawFile) -> Result<()> {
        let source = match SourceImage::sniff(file) {
            Ok(source) => source,
            Err(err) => {
                return match self.config.input_rejection {
                    InputRejection::Silent => {
                        debug!(error = %err, "ignoring non-image submission");
                        Ok(())
                    },
                    InputRejection::Error => Err(err),
                };
            },
        };

        self.abort_in_flight("superseded by new submission");
        self.release_held_refs();
        self.progress.reset();

        let original = self
            .registry
            .create_url(ImageBlob::new(source.media_type(), source.bytes().to_vec()));

        self.generation += 1;
        info!(
            generation = self.generation,
            source = source.name(),
            media_type = source.media_type(),
            capability = self.capability.name(),
            "submission accepted"
        );
        self.reporter.on_started(source.name());

        let capability = Arc::clone(&self.capability);
        let task = tokio::spawn(async move { capability.remove_background(&source).await });

        self.started = Some(Instant::now());
        self.in_flight = Some(InFlight {
            generation: self.generation,
            task,
        });
        self.state = PipelineState::Loading { original };
        Ok(())
    }

    /// Drive the in-flight request to completion, ticking simulated progress
    /// while waiting, and return the resulting view state
    ///
    /// Returns the current view unchanged when nothing is in flight.
    pub async fn wait(&mut self) -> ViewState {
        let Some(mut flight) = self.in_flight.take() else {
            return self.view();
        };

        let mut ticker = tokio::time::interval(self.config.progress_tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately; consume it so the
        // indicator starts moving one cadence after submission.
        ticker.tick().await;

        let joined = loop {
            tokio::select! {
                joined = &mut flight.task => break joined,
                _ = ticker.tick() => {
                    let percent = self.progress.tick();
                    self.reporter.on_progress(percent);
                },
            }
        };

        debug!(generation = flight.generation, "in-flight request settled");
        match joined {
            Ok(Ok(outcome)) => self.apply_completion(outcome),
            Ok(Err(err)) => self.apply_failure(&err),
            Err(join_err) if join_err.is_cancelled() => {
                self.apply_failure(&PipelineError::cancelled("request aborted while waiting"));
            },
            Err(join_err) => {
                self.apply_failure(&PipelineError::capability(format!(
                    "worker task failed: {join_err}"
                )));
            },
        }
        self.view()
    }

    /// Apply a capability result delivered out of band
    ///
    /// Normalizes the outcome per the decision table in
    /// [`RemovalOutcome::normalize`] and resolves the state machine. A
    /// completion arriving while nothing is loading is discarded.
    pub fn on_processing_complete(&mut self, outcome: RemovalOutcome) -> ViewState {
        if !self.is_loading() {
            warn!(kind = outcome.kind(), "completion with no submission in flight; discarded");
            return self.view();
        }
        self.abort_in_flight("completion delivered out of band");
        self.apply_completion(outcome);
        self.view()
    }

    /// Clear both source and result references, releasing any held handles
    pub fn reset(&mut self) {
        self.abort_in_flight("reset");
        self.release_held_refs();
        self.progress.reset();
        self.started = None;
        debug!("controller reset");
    }

    /// Current read-only view for the presentation layer
    #[must_use]
    pub fn view(&self) -> ViewState {
        match &self.state {
            PipelineState::Idle { original, result } => ViewState {
                original: original.clone(),
                result: result.clone(),
                loading: false,
                progress: self.progress.percent(),
            },
            PipelineState::Loading { original } => ViewState {
                original: Some(original.clone()),
                result: None,
                loading: true,
                progress: self.progress.percent(),
            },
        }
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, PipelineState::Loading { .. })
    }

    /// Dereference a display reference issued by this controller
    #[must_use]
    pub fn resolve(&self, display: &DisplayRef) -> Option<Arc<ImageBlob>> {
        self.registry.resolve(display)
    }

    /// Registry holding this controller's object URLs
    #[must_use]
    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    /// Download artifact name for the current result:
    /// `<epoch-millis>-<suffix>`
    #[must_use]
    pub fn download_name(&self) -> String {
        format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            self.config.download_suffix
        )
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn apply_completion(&mut self, outcome: RemovalOutcome) {
        debug!(kind = outcome.kind(), "normalizing capability result");
        match outcome.normalize(&self.registry) {
            Ok(display) => {
                let percent = self.progress.complete();
                self.reporter.on_progress(percent);
                let original = self.take_original();
                self.state = PipelineState::Idle {
                    original,
                    result: Some(display),
                };
                let elapsed = self
                    .started
                    .take()
                    .map_or(Duration::ZERO, |started| started.elapsed());
                info!(elapsed_ms = elapsed.as_millis() as u64, "processing complete");
                self.reporter.on_completed(elapsed);
            },
            Err(err) => self.apply_failure(&err),
        }
    }

    /// Resolve a failed request back to idle, keeping the source reference
    ///
    /// The single place an error is surfaced to the reporter, so each
    /// submission reports at most one failure.
    fn apply_failure(&mut self, err: &PipelineError) {
        warn!(error = %err, "background removal failed");
        self.reporter.on_error(&err.to_string());
        self.progress.reset();
        self.started = None;
        let original = self.take_original();
        self.state = PipelineState::Idle {
            original,
            result: None,
        };
    }

    /// Abort the in-flight worker task, if any
    fn abort_in_flight(&mut self, reason: &str) {
        if let Some(flight) = self.in_flight.take() {
            flight.task.abort();
            debug!(generation = flight.generation, reason, "aborted in-flight request");
        }
    }

    /// Take the current source reference out of the state without releasing it
    fn take_original(&mut self) -> Option<DisplayRef> {
        match std::mem::take(&mut self.state) {
            PipelineState::Idle { original, result } => {
                if let Some(result) = result {
                    self.registry.revoke(&result);
                }
                original
            },
            PipelineState::Loading { original } => Some(original),
        }
    }

    /// Revoke every reference held by the current state
    fn release_held_refs(&mut self) {
        match std::mem::take(&mut self.state) {
            PipelineState::Idle { original, result } => {
                if let Some(original) = original {
                    self.registry.revoke(&original);
                }
                if let Some(result) = result {
                    self.registry.revoke(&result);
                }
            },
            PipelineState::Loading { original } => {
                self.registry.revoke(&original);
            },
        }
    }
}

impl Drop for PipelineController {
    fn drop(&mut self) {
        self.abort_in_flight("teardown");
        self.release_held_refs();
    }
}
