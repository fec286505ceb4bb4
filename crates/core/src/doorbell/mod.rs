//! One doorbell: each ring runs capture, classify, resolve and present in
//! order, and overlapping rings are turned away.

use crate::capture::{CaptureError, CaptureSource};
use crate::classify::{Classifier, ClassifierError};
use crate::config::{AppConfig, FailurePolicy, HistoryCapacity, DEFAULT_RING_COOLDOWN_SECS};
use crate::mood::{resolve, ExpressionScores, MoodResult};
use crate::presentation::{
    format_confidence, headline, reaction_for, MoodHistory, MoodHistoryEntry, MoodStats, Reaction,
    RingOutcome, RingTracker,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::Mutex;

const LOG_TARGET: &str = "doorbell";

#[derive(thiserror::Error, Debug)]
pub enum DoorbellError {
    #[error("a ring is already being processed")]
    Busy,

    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("classification failed: {0}")]
    Classifier(#[from] ClassifierError),
}

#[derive(Clone, Debug)]
pub struct DoorbellConfig {
    pub history_capacity: HistoryCapacity,
    pub ring_cooldown: Duration,
    pub failure_policy: FailurePolicy,
    pub muted: bool,
}

impl DoorbellConfig {
    pub fn from_app(app: &AppConfig) -> Self {
        Self {
            history_capacity: app.history_capacity,
            ring_cooldown: app.ring_cooldown,
            failure_policy: app.failure_policy,
            muted: app.muted,
        }
    }
}

impl Default for DoorbellConfig {
    fn default() -> Self {
        Self {
            history_capacity: HistoryCapacity::default(),
            ring_cooldown: Duration::from_secs(DEFAULT_RING_COOLDOWN_SECS),
            failure_policy: FailurePolicy::default(),
            muted: false,
        }
    }
}

/// What the front end should show and play after a ring.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DoorbellEvent {
    pub result: MoodResult,
    pub reaction: &'static Reaction,
    pub headline: &'static str,
    pub confidence_text: String,
    /// Sound asset to play, absent while muted.
    pub sound: Option<&'static str>,
    pub ring_count: u32,
    pub insult: Option<&'static str>,
    pub observed_at: SystemTime,
}

struct DoorbellState {
    history: MoodHistory,
    rings: RingTracker,
    current: MoodResult,
    muted: bool,
}

pub struct Doorbell<K> {
    classifier: K,
    failure_policy: FailurePolicy,
    state: Mutex<DoorbellState>,
    in_flight: AtomicBool,
}

impl<K: Classifier> Doorbell<K> {
    pub fn new(classifier: K, config: DoorbellConfig) -> Self {
        Self {
            classifier,
            failure_policy: config.failure_policy,
            state: Mutex::new(DoorbellState {
                history: MoodHistory::new(config.history_capacity),
                rings: RingTracker::new(config.ring_cooldown),
                current: MoodResult::no_signal(),
                muted: config.muted,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn ring<C: CaptureSource + ?Sized>(
        &self,
        capture: &C,
    ) -> Result<DoorbellEvent, DoorbellError> {
        let _in_flight = InFlight::acquire(&self.in_flight).ok_or_else(|| {
            tracing::debug!(target: LOG_TARGET, "ring ignored, previous ring still running");
            DoorbellError::Busy
        })?;

        let outcome = {
            let mut state = self.state.lock().await;
            let mut rng = rand::rng();
            state.rings.ring(Instant::now(), &mut rng)
        };
        tracing::info!(target: LOG_TARGET, ring_count = outcome.count, "ring");

        let payload = capture.capture().await?;
        let kind = payload.kind;

        let scores = match self.classifier.classify(payload).await {
            Ok(scores) => scores,
            Err(e) => match self.failure_policy {
                FailurePolicy::NoSignal => {
                    tracing::warn!(
                        target: LOG_TARGET,
                        error = %e,
                        "classifier failed, treating as no signal"
                    );
                    ExpressionScores::new()
                }
                FailurePolicy::Surface => return Err(e.into()),
            },
        };

        let result = resolve(&scores);
        tracing::info!(
            target: LOG_TARGET,
            ?kind,
            label = %result.label,
            confidence = result.confidence,
            signal_present = result.signal_present,
            "mood resolved"
        );

        Ok(self.present_with(result, outcome).await)
    }

    /// Presents a result produced elsewhere, without counting a ring.
    pub async fn present(&self, result: MoodResult) -> DoorbellEvent {
        let outcome = {
            let state = self.state.lock().await;
            RingOutcome {
                count: state.rings.count_at(Instant::now()),
                insult: None,
            }
        };
        self.present_with(result, outcome).await
    }

    async fn present_with(&self, result: MoodResult, outcome: RingOutcome) -> DoorbellEvent {
        let observed_at = SystemTime::now();
        let reaction = reaction_for(result.label);

        let mut state = self.state.lock().await;
        state.current = result;
        if result.signal_present {
            state.history.record(result.label, observed_at);
        }

        DoorbellEvent {
            result,
            reaction,
            headline: headline(result.label),
            confidence_text: format_confidence(result.confidence),
            sound: (!state.muted).then_some(reaction.sound_asset),
            ring_count: outcome.count,
            insult: outcome.insult,
            observed_at,
        }
    }

    pub async fn current(&self) -> MoodResult {
        self.state.lock().await.current
    }

    pub async fn history(&self) -> Vec<MoodHistoryEntry> {
        self.state.lock().await.history.entries()
    }

    pub async fn stats(&self) -> MoodStats {
        self.state.lock().await.history.stats()
    }

    pub async fn set_muted(&self, muted: bool) {
        self.state.lock().await.muted = muted;
    }

    /// Flips the mute flag and returns the new value.
    pub async fn toggle_mute(&self) -> bool {
        let mut state = self.state.lock().await;
        state.muted = !state.muted;
        state.muted
    }
}

/// Marks a ring as in flight until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
