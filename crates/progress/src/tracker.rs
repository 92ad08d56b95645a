//! Pure per-job state machine over lifecycle events.
//!
//! [`JobWatch`] holds the display state for the one job the overlay can
//! track at a time (events are not scoped per submission, so the most
//! recent `execution_start` owns the surface). `apply` performs the
//! state transition and reports what should render; all timer and
//! banner side effects live in the consumer, which keeps this layer
//! directly testable.

use ume_core::types::Timestamp;

use crate::messages::{LifecycleEvent, ProgressPhase};

/// Display state for the currently tracked job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobState {
    pub job_id: String,
    pub started_at: Timestamp,
    /// Last liveness counter received from the remote worker.
    pub last_heartbeat: u64,
}

impl JobState {
    /// Whole seconds since the job started.
    ///
    /// Always recomputed from `started_at` so dropped ticks cannot skew
    /// the display.
    pub fn elapsed_secs(&self, now: Timestamp) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }
}

/// What a consumed event means for rendering.
///
/// The consumer pairs each transition with the display mode read at
/// that moment to produce banner calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// A new job started: begin the render tick and show the submitted
    /// message.
    Started,
    /// Heartbeat stored; nothing renders until the next tick.
    HeartbeatRecorded,
    /// Submission detail. Rendered in admin mode only.
    SubmitDetail { node_count: Option<u32> },
    /// Remote completion detail. Rendered in admin mode only.
    CompleteDetail {
        output_images: u32,
        output_nodes: usize,
        elapsed: Option<f64>,
    },
    /// Terminal success: stop the tick, render completion, schedule a
    /// hide. Carries the job state that was cleared.
    Finished { job: JobState },
    /// Terminal failure: stop the tick, render the (possibly
    /// classified) error, schedule a longer hide.
    Failed {
        exception_type: String,
        exception_message: String,
    },
    /// Nothing to do (no live job, or a no-op payload).
    Ignored,
}

/// Tracks at most one in-flight job.
#[derive(Debug, Default)]
pub struct JobWatch {
    current: Option<JobState>,
}

impl JobWatch {
    pub fn current(&self) -> Option<&JobState> {
        self.current.as_ref()
    }

    /// Whether a job is live and the render tick should be running.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Apply one event, returning what should render.
    pub fn apply(&mut self, event: &LifecycleEvent, now: Timestamp) -> Transition {
        match event {
            LifecycleEvent::ExecutionStart(data) => {
                // A new start always takes over the surface, whatever
                // was displayed before.
                self.current = Some(JobState {
                    job_id: data.prompt_id.clone(),
                    started_at: now,
                    last_heartbeat: 0,
                });
                Transition::Started
            }

            LifecycleEvent::Progress(data) => {
                let Some(job) = self.current.as_mut() else {
                    return Transition::Ignored;
                };
                match data.phase {
                    ProgressPhase::Submitting => Transition::SubmitDetail {
                        node_count: data.node_count,
                    },
                    ProgressPhase::Polling => {
                        if let Some(beat) = data.heartbeat {
                            job.last_heartbeat = beat;
                        }
                        Transition::HeartbeatRecorded
                    }
                    ProgressPhase::Complete => {
                        let (images, nodes) = match &data.output_nodes {
                            Some(map) => (map.values().sum(), map.len()),
                            None => (0, 0),
                        };
                        Transition::CompleteDetail {
                            output_images: images,
                            output_nodes: nodes,
                            elapsed: data.elapsed,
                        }
                    }
                }
            }

            LifecycleEvent::Executed(_) => match self.current.take() {
                Some(job) => Transition::Finished { job },
                None => Transition::Ignored,
            },

            // Failures always render, even when no job is being
            // displayed: the overlay is the only failure channel on
            // this path.
            LifecycleEvent::ExecutionError(data) => {
                self.current = None;
                Transition::Failed {
                    exception_type: data.exception_type.clone(),
                    exception_message: data.exception_message.clone(),
                }
            }
        }
    }
}
