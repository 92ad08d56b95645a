//! Serverless progress pipeline: lifecycle event parsing, per-job
//! display state, verbosity-aware formatting, and the consumer that
//! drives the status banner.
//!
//! Active only when the session resolved to serverless inference; the
//! local-mode submission path (`ume-queue`) renders its own progress
//! and the two are never installed together.

pub mod consumer;
pub mod feed;
pub mod format;
pub mod messages;
pub mod tracker;
