//! REST client for the queue manager's job-submission endpoint.

use serde::Serialize;
use ume_core::types::{ExecutionPayload, JobDescriptor};

/// Body of `POST /api/jobs`. One submission is issued per batch item.
#[derive(Debug, Clone, Serialize)]
pub struct JobSubmission {
    pub user_id: String,
    pub workflow: ExecutionPayload,
    pub priority: i32,
    pub metadata: BatchMetadata,
}

/// Position of a submission within its batch.
///
/// Items are otherwise independent and carry no cross-item identifier.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BatchMetadata {
    pub batch_index: usize,
    pub batch_total: usize,
}

/// Errors from the queue manager REST layer.
#[derive(Debug, thiserror::Error)]
pub enum QueueApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("Queue submission failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The queue manager returned a non-2xx status. The body is kept
    /// verbatim for the user-facing error message.
    #[error("Queue submission failed ({status}): {body}")]
    Api { status: u16, body: String },
}

/// HTTP client for the queue manager.
pub struct QueueApi {
    client: reqwest::Client,
    base_url: String,
}

impl QueueApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Submit one job.
    ///
    /// Returns the opaque descriptor assigned by the queue manager, or
    /// the error body on a non-2xx response.
    pub async fn submit_job(
        &self,
        submission: &JobSubmission,
    ) -> Result<JobDescriptor, QueueApiError> {
        let response = self
            .client
            .post(format!("{}/api/jobs", self.base_url))
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(QueueApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<JobDescriptor>().await?)
    }
}
