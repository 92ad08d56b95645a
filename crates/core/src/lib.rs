//! Shared types for the ComfyuME GPU bridge.
//!
//! Operating-mode and worker-identity types, user-id derivation, the
//! display-mode preference seam, and the host editor's graph-conversion
//! trait. Everything here is transport-free; the HTTP and WebSocket
//! layers live in `ume-queue` and `ume-progress`.

pub mod graph;
pub mod identity;
pub mod mode;
pub mod prefs;
pub mod types;
