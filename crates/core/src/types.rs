//! Primitive type aliases shared across the bridge.

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The serialized node-graph form the queue manager expects. Produced by
/// the host editor's graph conversion; opaque to the bridge.
pub type ExecutionPayload = serde_json::Value;

/// Opaque job descriptor returned by the queue manager on submission.
/// The bridge never inspects it, only hands it back to the caller.
pub type JobDescriptor = serde_json::Value;
