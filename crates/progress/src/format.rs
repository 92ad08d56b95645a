//! Verbosity-aware message formatting.
//!
//! Two strategies behind one trait keep the consumer's event handling
//! free of inline mode checks: [`UserFormat`] renders the plain
//! messages end users see, [`AdminFormat`] renders operator diagnostics
//! (job ids, worker identity, raw exception text). The strategy is
//! selected per render via [`format_for`], never cached, because the
//! preference can change mid-job.

use ume_core::mode::WorkerContext;
use ume_core::prefs::DisplayMode;

use crate::tracker::JobState;

/// User-facing rewrite of a routing failure.
pub const ROUTING_ERROR_MSG: &str = "GPU routing error — please try again";
/// User-facing rewrite of a timeout.
pub const TIMEOUT_ERROR_MSG: &str = "GPU timed out — please try again";

/// Rewrite well-known failure shapes into stable user-facing phrases.
///
/// Anything unrecognized passes through verbatim. Admin mode never
/// calls this; operators get the raw message.
pub fn classify_error(message: &str) -> &str {
    if message.contains("never appeared in history") {
        ROUTING_ERROR_MSG
    } else if message.contains("timed out") || message.contains("timeout") {
        TIMEOUT_ERROR_MSG
    } else {
        message
    }
}

/// Renders progress state into banner messages at one verbosity level.
pub trait ProgressFormat: Send + Sync {
    /// Message shown when a job starts.
    fn submitted(&self, job: &JobState, worker: Option<&WorkerContext>) -> String;

    /// Periodic in-flight message, rendered once per second.
    fn tick(&self, job: &JobState, elapsed_secs: i64) -> String;

    /// Extra detail for `submitting` progress. `None` means do not
    /// render.
    fn submit_detail(
        &self,
        job: &JobState,
        node_count: Option<u32>,
        worker: Option<&WorkerContext>,
    ) -> Option<String>;

    /// Extra detail for `complete` progress. `None` means do not
    /// render.
    fn complete_detail(
        &self,
        job: &JobState,
        output_images: u32,
        output_nodes: usize,
        elapsed_secs: i64,
    ) -> Option<String>;

    /// Terminal success message.
    fn completed(&self, job: &JobState, worker: Option<&WorkerContext>, elapsed_secs: i64)
        -> String;

    /// Terminal failure message.
    fn failed(&self, exception_type: &str, exception_message: &str) -> String;
}

/// Select the formatter for the display mode read just before this
/// render.
pub fn format_for(mode: DisplayMode) -> &'static dyn ProgressFormat {
    match mode {
        DisplayMode::User => &UserFormat,
        DisplayMode::Admin => &AdminFormat,
    }
}

/// Plain status messages; diagnostics never leak.
pub struct UserFormat;

impl ProgressFormat for UserFormat {
    fn submitted(&self, _job: &JobState, _worker: Option<&WorkerContext>) -> String {
        "Sending to GPU...".to_string()
    }

    fn tick(&self, _job: &JobState, elapsed_secs: i64) -> String {
        format!("Processing on GPU... {elapsed_secs}s")
    }

    fn submit_detail(
        &self,
        _job: &JobState,
        _node_count: Option<u32>,
        _worker: Option<&WorkerContext>,
    ) -> Option<String> {
        None
    }

    fn complete_detail(
        &self,
        _job: &JobState,
        _output_images: u32,
        _output_nodes: usize,
        _elapsed_secs: i64,
    ) -> Option<String> {
        None
    }

    fn completed(
        &self,
        _job: &JobState,
        _worker: Option<&WorkerContext>,
        elapsed_secs: i64,
    ) -> String {
        format!("Inference complete! ({elapsed_secs}s)")
    }

    fn failed(&self, _exception_type: &str, exception_message: &str) -> String {
        format!("Error: {}", classify_error(exception_message))
    }
}

/// Operator diagnostics: short job id, worker identity, raw errors.
pub struct AdminFormat;

impl ProgressFormat for AdminFormat {
    fn submitted(&self, job: &JobState, worker: Option<&WorkerContext>) -> String {
        format!(
            "Job {} sent to {}...",
            short_id(&job.job_id),
            worker_label(worker)
        )
    }

    fn tick(&self, job: &JobState, elapsed_secs: i64) -> String {
        format!(
            "Job {} processing... {}s (heartbeat {})",
            short_id(&job.job_id),
            elapsed_secs,
            job.last_heartbeat
        )
    }

    fn submit_detail(
        &self,
        job: &JobState,
        node_count: Option<u32>,
        worker: Option<&WorkerContext>,
    ) -> Option<String> {
        let nodes = node_count.unwrap_or(0);
        Some(format!(
            "Job {}: submitting {} node(s) to {}...",
            short_id(&job.job_id),
            nodes,
            endpoint_label(worker)
        ))
    }

    fn complete_detail(
        &self,
        job: &JobState,
        output_images: u32,
        output_nodes: usize,
        elapsed_secs: i64,
    ) -> Option<String> {
        Some(format!(
            "Job {}: {} image(s) from {} output node(s) ({}s)",
            short_id(&job.job_id),
            output_images,
            output_nodes,
            elapsed_secs
        ))
    }

    fn completed(
        &self,
        job: &JobState,
        worker: Option<&WorkerContext>,
        elapsed_secs: i64,
    ) -> String {
        format!(
            "Job {} complete on {} ({}s)",
            short_id(&job.job_id),
            worker_label(worker),
            elapsed_secs
        )
    }

    fn failed(&self, exception_type: &str, exception_message: &str) -> String {
        format!("Error: {exception_type}: {exception_message}")
    }
}

/// First eight characters of the job id, enough to find it in logs.
fn short_id(job_id: &str) -> &str {
    job_id.get(..8).unwrap_or(job_id)
}

/// Preferred display name of the worker: GPU id, then endpoint, then a
/// generic label.
fn worker_label(worker: Option<&WorkerContext>) -> &str {
    match worker {
        Some(w) if !w.active_gpu.is_empty() => &w.active_gpu,
        Some(w) if !w.endpoint.is_empty() => &w.endpoint,
        _ => "GPU",
    }
}

/// Endpoint identity for submission detail, falling back like
/// [`worker_label`].
fn endpoint_label(worker: Option<&WorkerContext>) -> &str {
    match worker {
        Some(w) if !w.endpoint.is_empty() => &w.endpoint,
        Some(w) if !w.active_gpu.is_empty() => &w.active_gpu,
        _ => "GPU",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job(id: &str, heartbeat: u64) -> JobState {
        JobState {
            job_id: id.into(),
            started_at: Utc::now(),
            last_heartbeat: heartbeat,
        }
    }

    fn worker(gpu: &str, endpoint: &str) -> WorkerContext {
        WorkerContext {
            active_gpu: gpu.into(),
            endpoint: endpoint.into(),
        }
    }

    #[test]
    fn routing_failure_is_classified_for_users() {
        let raw = "Serverless routing error: prompt accepted but never appeared in history after 95s.";
        assert_eq!(classify_error(raw), ROUTING_ERROR_MSG);
    }

    #[test]
    fn timeouts_are_classified_for_users() {
        assert_eq!(
            classify_error("Serverless execution timed out after 600s"),
            TIMEOUT_ERROR_MSG
        );
        assert_eq!(classify_error("read timeout"), TIMEOUT_ERROR_MSG);
    }

    #[test]
    fn unknown_messages_pass_through_verbatim() {
        assert_eq!(classify_error("out of memory"), "out of memory");
    }

    #[test]
    fn user_error_never_renders_exception_type() {
        let message = UserFormat.failed("RuntimeError", "out of memory");
        assert_eq!(message, "Error: out of memory");
        assert!(!message.contains("RuntimeError"));
    }

    #[test]
    fn user_error_applies_classification() {
        let message = UserFormat.failed(
            "ServerlessExecutionError",
            "prompt accepted but never appeared in history after 95s",
        );
        assert_eq!(message, format!("Error: {ROUTING_ERROR_MSG}"));
    }

    #[test]
    fn admin_error_is_raw_and_typed() {
        let message = AdminFormat.failed(
            "ServerlessExecutionError",
            "prompt accepted but never appeared in history after 95s",
        );
        assert!(message.contains("ServerlessExecutionError"));
        assert!(message.contains("never appeared in history"));
        assert!(!message.contains(ROUTING_ERROR_MSG));
    }

    #[test]
    fn admin_completion_names_worker_job_and_elapsed() {
        let message = AdminFormat.completed(
            &job("abcdef1234567890", 3),
            Some(&worker("gpu-1", "ep-abc")),
            2,
        );
        assert!(message.contains("gpu-1"));
        assert!(message.contains("abcdef12"));
        assert!(!message.contains("abcdef123"));
        assert!(message.contains("2s"));
    }

    #[test]
    fn admin_tick_includes_heartbeat() {
        let message = AdminFormat.tick(&job("abcdef12", 7), 14);
        assert!(message.contains("14s"));
        assert!(message.contains("heartbeat 7"));
    }

    #[test]
    fn user_detail_messages_are_suppressed() {
        let j = job("abcdef12", 0);
        assert!(UserFormat.submit_detail(&j, Some(12), None).is_none());
        assert!(UserFormat.complete_detail(&j, 3, 2, 40).is_none());
    }

    #[test]
    fn strategy_lookup_matches_mode() {
        let j = job("abcdef12", 0);
        let user = format_for(DisplayMode::User).submitted(&j, None);
        assert_eq!(user, "Sending to GPU...");
        let admin = format_for(DisplayMode::Admin).submitted(&j, None);
        assert!(admin.contains("abcdef12"));
    }

    #[test]
    fn short_job_ids_are_not_truncated() {
        let message = AdminFormat.tick(&job("ab", 0), 1);
        assert!(message.contains("Job ab "));
    }
}
