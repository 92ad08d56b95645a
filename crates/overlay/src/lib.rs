//! Shared floating status surface for the GPU bridge.
//!
//! Both submission-side owners (the local-mode queue redirect and the
//! serverless progress consumer) render through one [`StatusBanner`] so
//! two independent timers never fight over the same visual element.

pub mod banner;
pub mod color;

pub use banner::{BannerState, StatusBanner, DEFAULT_HIDE_DELAY};
pub use color::BannerColor;
