//! One-shot operating-mode probe against the queue manager.

use serde::Deserialize;
use ume_core::mode::{InferenceMode, WorkerContext};

/// Result of a health probe: the operating mode for this session, plus
/// worker identity for display (serverless only).
#[derive(Debug, Clone, Default)]
pub struct ModeReport {
    pub mode: InferenceMode,
    pub worker: Option<WorkerContext>,
}

/// Body of `GET /api/health`.
///
/// Every field is optional; an older queue manager may omit any of them
/// and absence always means local/empty.
#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    inference_mode: Option<String>,
    #[serde(default)]
    active_gpu: Option<String>,
    #[serde(default)]
    serverless_endpoint: Option<String>,
}

/// Internal probe failures. Never surfaced: the probe fails soft.
#[derive(Debug, thiserror::Error)]
enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("health endpoint returned status {0}")]
    Status(u16),
}

/// Health-endpoint client, called at most once per session setup.
pub struct HealthProbe {
    client: reqwest::Client,
    base_url: String,
}

impl HealthProbe {
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

    /// Classify the current operating mode.
    ///
    /// Never fails: a missing, unreachable, or broken health endpoint
    /// must not block the editor's default behavior, so every error
    /// resolves to local mode with no worker context.
    pub async fn check(&self) -> ModeReport {
        let body = match self.fetch().await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(%error, "Health probe failed, assuming local inference");
                return ModeReport::default();
            }
        };

        let mode = InferenceMode::from_wire(body.inference_mode.as_deref());
        let worker = match mode {
            InferenceMode::Serverless => Some(WorkerContext {
                active_gpu: body.active_gpu.unwrap_or_default(),
                endpoint: body.serverless_endpoint.unwrap_or_default(),
            }),
            InferenceMode::Local => None,
        };

        tracing::info!(%mode, "Inference mode resolved");
        ModeReport { mode, worker }
    }

    async fn fetch(&self) -> Result<HealthBody, ProbeError> {
        let response = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        Ok(response.json::<HealthBody>().await?)
    }
}
