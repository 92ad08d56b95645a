//! Session wiring for the GPU bridge.
//!
//! [`setup::activate`] runs the one-shot mode probe and hands the
//! embedding host exactly one submission-side owner: the local-mode
//! queue redirect or the serverless progress consumer, never both.

pub mod config;
pub mod setup;
