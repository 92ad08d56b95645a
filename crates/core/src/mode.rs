//! Session operating mode and serverless worker identity.

/// How inference jobs are executed for this session.
///
/// Resolved once per setup by the health probe and never re-checked
/// mid-session, even if the queue manager changes mode underneath us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceMode {
    /// Jobs are queued through the queue manager's local path. The
    /// editor's native submission entry point is intercepted.
    #[default]
    Local,
    /// Jobs run on a remote serverless worker pool. The native path is
    /// left untouched and progress arrives via lifecycle events.
    Serverless,
}

impl InferenceMode {
    /// Map the health endpoint's `inference_mode` string.
    ///
    /// Anything other than `"serverless"` (including an absent field)
    /// is treated as local.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("serverless") => Self::Serverless,
            _ => Self::Local,
        }
    }
}

impl std::fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Serverless => f.write_str("serverless"),
        }
    }
}

/// Identity of the active serverless worker.
///
/// Used only in rendered messages, never in control-flow decisions.
/// Either field may be empty when the queue manager omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerContext {
    /// GPU type or worker id, e.g. `gpu-1`.
    pub active_gpu: String,
    /// Endpoint identifier of the serverless deployment.
    pub endpoint: String,
}
