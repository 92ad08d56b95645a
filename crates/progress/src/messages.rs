//! Lifecycle event types and parser.
//!
//! The queue manager publishes JSON events shaped
//! `{"type": "<kind>", "data": {...}}`, delivered out-of-band from any
//! submission call. This module deserializes them into a strongly-typed
//! [`LifecycleEvent`] enum.

use std::collections::HashMap;

use serde::Deserialize;

/// All lifecycle event kinds the overlay consumes.
///
/// Deserialized via the internally-tagged `"type"` field with
/// associated `"data"` content.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LifecycleEvent {
    /// A job has been accepted and started executing remotely.
    #[serde(rename = "execution_start")]
    ExecutionStart(ExecutionStartData),

    /// Phase-tagged progress from the queue manager while the job is
    /// in flight.
    #[serde(rename = "progress")]
    Progress(ProgressData),

    /// Terminal success: the job will produce no further updates.
    #[serde(rename = "executed")]
    Executed(ExecutedData),

    /// Terminal failure.
    #[serde(rename = "execution_error")]
    ExecutionError(ErrorData),
}

/// Payload for `execution_start` events.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStartData {
    pub prompt_id: String,
}

/// Where in its remote lifecycle the job currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPhase {
    /// The workflow is being handed to the serverless endpoint.
    Submitting,
    /// Waiting on the remote worker; heartbeats indicate liveness.
    Polling,
    /// Remote execution finished; output metadata is available.
    Complete,
}

/// Payload for `progress` events. Fields beyond `phase` are
/// phase-dependent and optional.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressData {
    pub phase: ProgressPhase,
    #[serde(default)]
    pub prompt_id: Option<String>,
    /// Number of nodes in the submitted workflow (`submitting`).
    #[serde(default)]
    pub node_count: Option<u32>,
    /// Monotonically increasing liveness counter (`polling`).
    #[serde(default)]
    pub heartbeat: Option<u64>,
    /// Server-measured elapsed seconds (`complete`).
    #[serde(default)]
    pub elapsed: Option<f64>,
    /// Image count per output node (`complete`).
    #[serde(default)]
    pub output_nodes: Option<HashMap<String, u32>>,
}

/// Payload for `executed` events. The event is terminal; its payload
/// carries nothing the overlay needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutedData {}

/// Payload for `execution_error` events.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorData {
    pub exception_type: String,
    pub exception_message: String,
}

/// Parse a lifecycle event from a feed text frame.
///
/// Returns `Err` for malformed JSON or unknown `type` values. Callers
/// should log unknown types and continue.
pub fn parse_event(text: &str) -> Result<LifecycleEvent, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_execution_start() {
        let json = r#"{"type":"execution_start","data":{"prompt_id":"abcdef12"}}"#;
        match parse_event(json).unwrap() {
            LifecycleEvent::ExecutionStart(data) => {
                assert_eq!(data.prompt_id, "abcdef12");
            }
            other => panic!("Expected ExecutionStart, got {other:?}"),
        }
    }

    #[test]
    fn parse_submitting_progress() {
        let json = r#"{"type":"progress","data":{"phase":"submitting","prompt_id":"abc","node_count":12}}"#;
        match parse_event(json).unwrap() {
            LifecycleEvent::Progress(data) => {
                assert_eq!(data.phase, ProgressPhase::Submitting);
                assert_eq!(data.node_count, Some(12));
                assert_eq!(data.heartbeat, None);
            }
            other => panic!("Expected Progress, got {other:?}"),
        }
    }

    #[test]
    fn parse_polling_progress() {
        let json = r#"{"type":"progress","data":{"phase":"polling","heartbeat":7}}"#;
        match parse_event(json).unwrap() {
            LifecycleEvent::Progress(data) => {
                assert_eq!(data.phase, ProgressPhase::Polling);
                assert_eq!(data.heartbeat, Some(7));
            }
            other => panic!("Expected Progress, got {other:?}"),
        }
    }

    #[test]
    fn parse_complete_progress_with_output_nodes() {
        let json = r#"{"type":"progress","data":{"phase":"complete","elapsed":42.5,"output_nodes":{"9":2,"12":1}}}"#;
        match parse_event(json).unwrap() {
            LifecycleEvent::Progress(data) => {
                assert_eq!(data.phase, ProgressPhase::Complete);
                assert_eq!(data.elapsed, Some(42.5));
                let nodes = data.output_nodes.unwrap();
                assert_eq!(nodes.get("9"), Some(&2));
                assert_eq!(nodes.get("12"), Some(&1));
            }
            other => panic!("Expected Progress, got {other:?}"),
        }
    }

    #[test]
    fn parse_executed() {
        let json = r#"{"type":"executed","data":{}}"#;
        assert!(matches!(
            parse_event(json).unwrap(),
            LifecycleEvent::Executed(_)
        ));
    }

    #[test]
    fn parse_execution_error() {
        let json = r#"{"type":"execution_error","data":{"exception_type":"RuntimeError","exception_message":"out of memory"}}"#;
        match parse_event(json).unwrap() {
            LifecycleEvent::ExecutionError(data) => {
                assert_eq!(data.exception_type, "RuntimeError");
                assert_eq!(data.exception_message, "out of memory");
            }
            other => panic!("Expected ExecutionError, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(parse_event(r#"{"type":"status","data":{}}"#).is_err());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(parse_event("not json at all").is_err());
    }
}
