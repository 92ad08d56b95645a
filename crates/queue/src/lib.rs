//! Queue manager client: mode probe, job submission, and the
//! intercepted submission path.
//!
//! In local mode the bridge replaces the editor's native submission
//! entry point with [`redirect::QueueRedirect`], which fans a logical
//! submission out into sequential per-batch-item requests against the
//! queue manager. The one-shot [`probe::HealthProbe`] decides whether
//! that interception is installed at all.

pub mod api;
pub mod probe;
pub mod redirect;
