//! Interception of the editor's submission entry point (local mode).
//!
//! When the session resolves to local inference, the host editor's
//! native queue is bypassed: each user submission is converted to an
//! execution payload once, then fanned out into `batch_count`
//! sequential requests against the queue manager, with the status
//! banner reflecting true progress throughout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use ume_core::graph::{GraphError, GraphSource};
use ume_core::types::JobDescriptor;
use ume_overlay::{BannerColor, StatusBanner};

use crate::api::{BatchMetadata, JobSubmission, QueueApi, QueueApiError};

/// Hide delay after a successful batch.
const SUCCESS_HIDE: Duration = Duration::from_secs(4);
/// Hide delay after a failed batch, long enough to read the error.
const FAILURE_HIDE: Duration = Duration::from_secs(8);
/// Interval between elapsed-time banner updates.
const TICK: Duration = Duration::from_secs(1);

/// Capability the host editor exposes for replacing its submission
/// path. The host invokes the registered interceptor instead of its
/// native queue entry point.
#[async_trait]
pub trait SubmissionInterceptor: Send + Sync {
    /// Submit the current graph `batch_count` times.
    ///
    /// Returns the descriptor of the last submitted item; failures are
    /// rendered on the banner and also returned, since the host may
    /// show its own secondary error surface.
    async fn submit_batch(&self, batch_count: usize) -> Result<JobDescriptor, RedirectError>;
}

/// Failures on the intercepted submission path.
#[derive(Debug, thiserror::Error)]
pub enum RedirectError {
    /// The graph could not be serialized; no request was issued.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Batch item `index` failed; later items were never sent.
    #[error("{source}")]
    Submission {
        index: usize,
        #[source]
        source: QueueApiError,
    },
}

/// The intercepted submission entry point.
///
/// Constructed only when the mode probe resolved to local inference;
/// under serverless the native path is left untouched.
pub struct QueueRedirect {
    api: QueueApi,
    graph: Arc<dyn GraphSource>,
    banner: Arc<StatusBanner>,
    user_id: String,
    priority: i32,
}

impl QueueRedirect {
    /// `user_id` is derived once, at interception setup, from the
    /// session's routing context (see `ume_core::identity`).
    pub fn new(
        api: QueueApi,
        graph: Arc<dyn GraphSource>,
        banner: Arc<StatusBanner>,
        user_id: String,
        priority: i32,
    ) -> Self {
        Self {
            api,
            graph,
            banner,
            user_id,
            priority,
        }
    }

    /// Build the payload and push the batch, strictly in index order.
    ///
    /// Item `i` goes out only after item `i - 1` resolved, and the
    /// first failure stops the batch so the failure index is
    /// deterministic.
    async fn dispatch(&self, batch_count: usize) -> Result<JobDescriptor, RedirectError> {
        let payload = self.graph.graph_to_prompt().await?;
        self.banner
            .show("Submitting to serverless GPU...", BannerColor::Info);

        let mut last = None;
        for index in 0..batch_count {
            let submission = JobSubmission {
                user_id: self.user_id.clone(),
                workflow: payload.clone(),
                priority: self.priority,
                metadata: BatchMetadata {
                    batch_index: index,
                    batch_total: batch_count,
                },
            };

            let descriptor = self
                .api
                .submit_job(&submission)
                .await
                .map_err(|source| RedirectError::Submission { index, source })?;

            tracing::info!(
                user_id = %self.user_id,
                index,
                total = batch_count,
                "Job submitted",
            );
            last = Some(descriptor);
        }

        // The last item's descriptor is the aggregate result; earlier
        // descriptors are discarded. An empty batch resolves to null
        // without touching the queue manager.
        Ok(last.unwrap_or(JobDescriptor::Null))
    }
}

#[async_trait]
impl SubmissionInterceptor for QueueRedirect {
    async fn submit_batch(&self, batch_count: usize) -> Result<JobDescriptor, RedirectError> {
        tracing::info!(batch_count, "Intercepting job submission");
        let started = Instant::now();
        self.banner.show("Sending to GPU...", BannerColor::Info);
        let ticker = spawn_elapsed_ticker(Arc::clone(&self.banner), started);

        let result = self.dispatch(batch_count).await;

        // The ticker must stop before the terminal message goes up, or
        // a stale tick would overwrite it.
        ticker.abort();

        match &result {
            Ok(_) => {
                let elapsed = started.elapsed().as_secs();
                tracing::info!(batch_count, elapsed, "All jobs submitted");
                self.banner.show(
                    format!("Inference complete! ({elapsed}s)"),
                    BannerColor::Success,
                );
                self.banner.hide(SUCCESS_HIDE);
            }
            Err(error) => {
                tracing::error!(%error, "Batch submission failed");
                self.banner
                    .show(format!("Error: {error}"), BannerColor::Error);
                self.banner.hide(FAILURE_HIDE);
            }
        }

        result
    }
}

/// Overwrite the banner with recomputed elapsed time once per second
/// while items are in flight.
fn spawn_elapsed_ticker(banner: Arc<StatusBanner>, started: Instant) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
        loop {
            tick.tick().await;
            let elapsed = started.elapsed().as_secs();
            banner.show(
                format!("Processing on GPU... {elapsed}s"),
                BannerColor::Working,
            );
        }
    })
}
