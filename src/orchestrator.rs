//! One generation cycle, end to end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::classify::{classify, ErrorReport};
use crate::enhance::enhance;
use crate::error::GenerationError;
use crate::fanout;
use crate::models::{GeneratedImage, GenerationRequest};
use crate::progress::{Phase, ProgressConfig, ProgressState, ProgressTicker, ProgressTracker};
use crate::prompt::RenderContext;
use crate::provider::GenerativeProvider;
use crate::variations;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("a generation cycle is already in progress")]
    Busy,
    #[error("{}", .0.title)]
    Failed(ErrorReport),
}

/// Owns the result feed, the last error report and the progress signal.
pub struct Forge {
    provider: Arc<dyn GenerativeProvider>,
    progress: ProgressTracker,
    feed: RwLock<Vec<GeneratedImage>>,
    last_error: RwLock<Option<ErrorReport>>,
    in_flight: AtomicBool,
}

struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Forge {
    pub fn new(provider: Arc<dyn GenerativeProvider>, progress: ProgressConfig) -> Self {
        Self {
            provider,
            progress: ProgressTracker::new(progress),
            feed: RwLock::default(),
            last_error: RwLock::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn provider(&self) -> &dyn GenerativeProvider {
        self.provider.as_ref()
    }

    /// Newest first.
    pub fn images(&self) -> Vec<GeneratedImage> {
        self.feed.read().clone()
    }

    pub fn image(&self, id: Uuid) -> Option<GeneratedImage> {
        self.feed.read().iter().find(|img| img.id == id).cloned()
    }

    pub fn last_error(&self) -> Option<ErrorReport> {
        self.last_error.read().clone()
    }

    pub fn progress(&self) -> ProgressState {
        self.progress.snapshot()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<CycleGuard<'_>, CycleError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| CycleGuard(&self.in_flight))
            .map_err(|_| CycleError::Busy)
    }

    /// Runs one cycle. On success the new images are prepended to the feed and
    /// returned; on failure the feed is untouched and the classified report is
    /// stored and returned.
    pub async fn generate(&self, request: GenerationRequest) -> Result<Vec<GeneratedImage>, CycleError> {
        let _guard = self.begin()?;
        *self.last_error.write() = None;

        info!("🚀 Generating {} banner(s) for: {}", request.variation_count.get(), request.description);
        let ticker = self.progress.start(request.variation_count);

        match self.run(&request, &ticker).await {
            Ok(images) => {
                {
                    let mut feed = self.feed.write();
                    let older = std::mem::take(&mut *feed);
                    feed.extend(images.iter().cloned());
                    feed.extend(older);
                }
                info!("✅ Generated {} banner(s)", images.len());
                ticker.complete().await;
                Ok(images)
            }
            Err(e) => {
                ticker.fail().await;
                let report = classify(&e);
                error!(error = %e, category = %report.title, "❌ Generation failed");
                *self.last_error.write() = Some(report.clone());
                Err(CycleError::Failed(report))
            }
        }
    }

    async fn run(&self, request: &GenerationRequest, ticker: &ProgressTicker) -> Result<Vec<GeneratedImage>, GenerationError> {
        let provider = self.provider.as_ref();

        let base = if request.auto_enhance {
            ticker.set_phase(Phase::Enhancing);
            enhance(provider, &request.description).await
        } else {
            request.description.clone()
        };

        if request.variation_count.is_multi() {
            ticker.set_phase(Phase::Planning);
        }
        let variants = variations::plan(provider, &base, request.variation_count).await;

        ticker.set_phase(Phase::Rendering(request.variation_count));
        fanout::run(provider, &variants, &RenderContext::from(request)).await
    }
}
