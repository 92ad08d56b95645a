//! Serverless progress consumer: drives the status banner from the
//! lifecycle event stream.
//!
//! Rendering happens only on the 1 s tick or on terminal events;
//! `polling` progress updates state that the next tick picks up, never
//! the banner directly, so the timer and the event stream cannot
//! interleave writes. The display mode is re-read from the preference
//! store before every render decision.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, Interval};
use tokio_util::sync::CancellationToken;

use ume_core::mode::WorkerContext;
use ume_core::prefs::PreferenceStore;
use ume_overlay::{BannerColor, StatusBanner};

use crate::format::format_for;
use crate::messages::LifecycleEvent;
use crate::tracker::{JobWatch, Transition};

/// Interval between elapsed-time renders while a job is live.
const RENDER_TICK: Duration = Duration::from_secs(1);
/// Hide delay after terminal success.
const SUCCESS_HIDE: Duration = Duration::from_secs(4);
/// Hide delay after terminal failure.
const FAILURE_HIDE: Duration = Duration::from_secs(10);

/// Consumes lifecycle events and renders them onto the shared banner.
///
/// Constructed only when the session resolved to serverless inference;
/// the local-mode redirect owns the banner otherwise, so the two can
/// never interleave messages for the same logical job.
pub struct ProgressConsumer {
    banner: Arc<StatusBanner>,
    prefs: Arc<dyn PreferenceStore>,
    /// Worker identity from the mode probe, display only.
    worker: Option<WorkerContext>,
}

impl ProgressConsumer {
    pub fn new(
        banner: Arc<StatusBanner>,
        prefs: Arc<dyn PreferenceStore>,
        worker: Option<WorkerContext>,
    ) -> Self {
        Self {
            banner,
            prefs,
            worker,
        }
    }

    /// Consume events until the channel closes or `cancel` fires.
    pub async fn run(
        self,
        mut events: broadcast::Receiver<LifecycleEvent>,
        cancel: CancellationToken,
    ) {
        let mut watch = JobWatch::default();
        let mut ticker = fresh_ticker();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,

                received = events.recv() => match received {
                    Ok(event) => {
                        if self.handle(&mut watch, &event) {
                            // New job: restart the tick so the first
                            // elapsed render lands a full second in.
                            ticker = fresh_ticker();
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Progress consumer lagging, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },

                _ = ticker.tick(), if watch.is_active() => self.render_tick(&watch),
            }
        }

        tracing::debug!("Progress consumer stopped");
    }

    /// Apply one event and render its transition. Returns `true` when a
    /// new job started.
    fn handle(&self, watch: &mut JobWatch, event: &LifecycleEvent) -> bool {
        let now = Utc::now();
        // Re-read on every render decision: the operator may toggle
        // verbosity mid-job.
        let format = format_for(self.prefs.display_mode());

        match watch.apply(event, now) {
            Transition::Started => {
                if let Some(job) = watch.current() {
                    tracing::info!(job_id = %job.job_id, "Serverless execution started");
                    self.banner
                        .show(format.submitted(job, self.worker.as_ref()), BannerColor::Info);
                }
                return true;
            }

            // Rendered on the next tick, never immediately.
            Transition::HeartbeatRecorded => {}

            Transition::SubmitDetail { node_count } => {
                if let Some(job) = watch.current() {
                    if let Some(message) =
                        format.submit_detail(job, node_count, self.worker.as_ref())
                    {
                        self.banner.show(message, BannerColor::Info);
                    }
                }
            }

            Transition::CompleteDetail {
                output_images,
                output_nodes,
                elapsed,
            } => {
                if let Some(job) = watch.current() {
                    let secs = elapsed
                        .map(|e| e as i64)
                        .unwrap_or_else(|| job.elapsed_secs(now));
                    if let Some(message) =
                        format.complete_detail(job, output_images, output_nodes, secs)
                    {
                        self.banner.show(message, BannerColor::Success);
                    }
                }
            }

            Transition::Finished { job } => {
                let elapsed = job.elapsed_secs(now);
                tracing::info!(job_id = %job.job_id, elapsed, "Serverless execution complete");
                self.banner.show(
                    format.completed(&job, self.worker.as_ref(), elapsed),
                    BannerColor::Success,
                );
                self.banner.hide(SUCCESS_HIDE);
            }

            Transition::Failed {
                exception_type,
                exception_message,
            } => {
                tracing::error!(
                    %exception_type,
                    %exception_message,
                    "Serverless execution failed",
                );
                self.banner.show(
                    format.failed(&exception_type, &exception_message),
                    BannerColor::Error,
                );
                self.banner.hide(FAILURE_HIDE);
            }

            Transition::Ignored => {}
        }
        false
    }

    fn render_tick(&self, watch: &JobWatch) {
        let Some(job) = watch.current() else { return };
        let format = format_for(self.prefs.display_mode());
        self.banner.show(
            format.tick(job, job.elapsed_secs(Utc::now())),
            BannerColor::Working,
        );
    }
}

fn fresh_ticker() -> Interval {
    interval_at(Instant::now() + RENDER_TICK, RENDER_TICK)
}
