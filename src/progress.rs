//! Time-driven progress estimate for a generation cycle.
//!
//! The provider exposes no real progress signal, so the fraction is advanced
//! by a ticker task on a fixed schedule and only reaches 100 when the cycle
//! actually succeeds.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::VariationCount;

/// The ticker never moves past this on its own.
pub const PROGRESS_CEILING: f64 = 95.0;
pub const PROGRESS_COMPLETE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Initializing,
    Enhancing,
    Planning,
    Rendering(VariationCount),
}

impl Phase {
    pub fn label(self) -> String {
        match self {
            Phase::Idle => "GENERATE ASSET".into(),
            Phase::Initializing => "INITIALIZING...".into(),
            Phase::Enhancing => "ENHANCING PROMPT...".into(),
            Phase::Planning => "DESIGNING VARIATIONS...".into(),
            Phase::Rendering(VariationCount::One) => "RENDERING ASSET...".into(),
            Phase::Rendering(n) => format!("RENDERING {} ASSETS...", n.get()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressState {
    pub fraction: f64,
    pub label: String,
}

impl ProgressState {
    fn at(fraction: f64, phase: Phase) -> Self {
        Self { fraction, label: phase.label() }
    }

    fn advance(&mut self, increment: f64) {
        self.fraction = (self.fraction + increment).min(PROGRESS_CEILING);
    }
}

impl Default for ProgressState {
    fn default() -> Self { Self::at(0.0, Phase::Idle) }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressConfig {
    pub single_estimate: Duration,
    pub multi_estimate: Duration,
    pub tick: Duration,
    pub completion_grace: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            single_estimate: Duration::from_millis(8000),
            multi_estimate: Duration::from_millis(15000),
            tick: Duration::from_millis(100),
            completion_grace: Duration::from_millis(600),
        }
    }
}

impl ProgressConfig {
    pub fn estimate(&self, count: VariationCount) -> Duration {
        if count.is_multi() { self.multi_estimate } else { self.single_estimate }
    }

    /// Percentage added per tick so the ceiling is reached at the estimated duration.
    pub fn increment(&self, count: VariationCount) -> f64 {
        let steps = self.estimate(count).as_secs_f64() / self.tick.as_secs_f64();
        if steps > 0.0 { PROGRESS_CEILING / steps } else { PROGRESS_CEILING }
    }
}

/// Holds the published [`ProgressState`] and starts one ticker per cycle.
pub struct ProgressTracker {
    tx: Arc<watch::Sender<ProgressState>>,
    config: ProgressConfig,
}

impl ProgressTracker {
    pub fn new(config: ProgressConfig) -> Self {
        let (tx, _rx) = watch::channel(ProgressState::default());
        Self { tx: Arc::new(tx), config }
    }

    pub fn snapshot(&self) -> ProgressState {
        self.tx.borrow().clone()
    }

    /// Resets to 0 and spawns the ticker for one cycle.
    pub fn start(&self, count: VariationCount) -> ProgressTicker {
        self.tx.send_replace(ProgressState::at(0.0, Phase::Initializing));

        let token = CancellationToken::new();
        let increment = self.config.increment(count);
        let tick = self.config.tick;
        let tx = Arc::clone(&self.tx);
        let cancelled = token.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await; // first tick completes immediately
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    // Checked under the channel lock so a tick can never land after a reset.
                    _ = interval.tick() => {
                        tx.send_if_modified(|s| {
                            if cancelled.is_cancelled() {
                                return false;
                            }
                            s.advance(increment);
                            true
                        });
                    }
                }
            }
            debug!("progress ticker stopped");
        });

        ProgressTicker {
            tx: Arc::clone(&self.tx),
            token,
            handle: Some(handle),
            grace: self.config.completion_grace,
            finished: false,
        }
    }
}

/// Handle for one cycle's ticker. Dropping it cancels the ticker, so it can
/// never outlive the cycle that started it. A cycle abandoned mid-flight
/// resets the published state just like a failed one.
pub struct ProgressTicker {
    tx: Arc<watch::Sender<ProgressState>>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
    grace: Duration,
    finished: bool,
}

impl ProgressTicker {
    /// Changes the label without touching the fraction.
    pub fn set_phase(&self, phase: Phase) {
        self.tx.send_modify(|s| s.label = phase.label());
    }

    async fn stop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Shows a full bar for the grace period, then resets.
    pub async fn complete(mut self) {
        self.stop().await;
        self.tx.send_modify(|s| s.fraction = PROGRESS_COMPLETE);
        tokio::time::sleep(self.grace).await;
        self.reset();
    }

    pub async fn fail(mut self) {
        self.stop().await;
        self.reset();
    }

    fn reset(&mut self) {
        self.tx.send_replace(ProgressState::default());
        self.finished = true;
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.token.cancel();
        if !self.finished {
            debug!("progress ticker dropped mid-cycle");
            self.reset();
        }
    }
}
