//! Host editor collaborator: graph-to-payload conversion.

use async_trait::async_trait;

use crate::types::ExecutionPayload;

/// Conversion from the editor's node graph to the execution payload the
/// queue manager expects. Implemented by the embedding editor.
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Serialize the current graph.
    ///
    /// A failure here aborts the whole submission before any request is
    /// issued, and is surfaced exactly like a submission failure.
    async fn graph_to_prompt(&self) -> Result<ExecutionPayload, GraphError>;
}

/// The graph could not be converted to an execution payload.
#[derive(Debug, thiserror::Error)]
#[error("Failed to convert graph to execution payload: {0}")]
pub struct GraphError(pub String);
