//! The status banner: a two-method rendering primitive.
//!
//! [`StatusBanner`] knows nothing about jobs, modes, or events. It holds
//! the displayed message plus at most one pending auto-hide task, and
//! publishes every change on a `watch` channel for whatever surface
//! actually draws it (editor DOM shim, headless monitor log, tests).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::color::BannerColor;

/// Default delay before a scheduled hide takes effect.
pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Rendered state of the banner.
#[derive(Debug, Clone, PartialEq)]
pub struct BannerState {
    pub visible: bool,
    pub message: String,
    pub color: BannerColor,
}

impl Default for BannerState {
    fn default() -> Self {
        Self {
            visible: false,
            message: String::new(),
            color: BannerColor::Info,
        }
    }
}

/// Shared status surface.
///
/// Explicitly constructed and injected; consumers hold an
/// `Arc<StatusBanner>` rather than reaching into ambient global state.
/// Invariant: at most one pending hide task exists at a time, and
/// [`show`](Self::show) cancels it, so a later `show` always wins even
/// if an earlier caller believes its sequence is still current.
pub struct StatusBanner {
    updates: watch::Sender<BannerState>,
    pending_hide: Mutex<Option<JoinHandle<()>>>,
}

impl StatusBanner {
    /// Create a hidden banner.
    pub fn new() -> Arc<Self> {
        let (updates, _) = watch::channel(BannerState::default());
        Arc::new(Self {
            updates,
            pending_hide: Mutex::new(None),
        })
    }

    /// Observe banner state changes.
    pub fn subscribe(&self) -> watch::Receiver<BannerState> {
        self.updates.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> BannerState {
        self.updates.borrow().clone()
    }

    /// Replace the displayed message and make the banner visible.
    ///
    /// Immediate and idempotent: any pending hide is cancelled and the
    /// previous message is overwritten without queueing.
    pub fn show(&self, message: impl Into<String>, color: BannerColor) {
        self.cancel_pending_hide();
        let message = message.into();
        tracing::debug!(%message, color = color.hex(), "Banner show");
        self.updates.send_replace(BannerState {
            visible: true,
            message,
            color,
        });
    }

    /// Schedule the banner to disappear after `delay`.
    ///
    /// Replaces any previously scheduled hide; a `show` before the
    /// deadline cancels it.
    pub fn hide(self: &Arc<Self>, delay: Duration) {
        let banner = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            banner.conceal();
        });
        let mut pending = self.pending_hide.lock().expect("banner lock");
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }

    fn conceal(&self) {
        tracing::debug!("Banner hidden");
        self.updates.send_modify(|state| state.visible = false);
    }

    fn cancel_pending_hide(&self) {
        let mut pending = self.pending_hide.lock().expect("banner lock");
        if let Some(task) = pending.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn show_makes_banner_visible() {
        let banner = StatusBanner::new();
        banner.show("Sending to GPU...", BannerColor::Info);

        let state = banner.state();
        assert!(state.visible);
        assert_eq!(state.message, "Sending to GPU...");
        assert_eq!(state.color, BannerColor::Info);
    }

    #[tokio::test(start_paused = true)]
    async fn hide_conceals_after_delay() {
        let banner = StatusBanner::new();
        banner.show("done", BannerColor::Success);
        banner.hide(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        let state = banner.state();
        assert!(!state.visible);
        // The message itself is retained; only visibility flips.
        assert_eq!(state.message, "done");
    }

    #[tokio::test(start_paused = true)]
    async fn show_cancels_pending_hide() {
        let banner = StatusBanner::new();
        banner.show("A", BannerColor::Info);
        banner.hide(Duration::from_secs(3));
        banner.show("B", BannerColor::Working);

        // Wait past the first hide deadline: the banner must still be
        // visible with the later message.
        tokio::time::sleep(Duration::from_secs(5)).await;
        let state = banner.state();
        assert!(state.visible);
        assert_eq!(state.message, "B");
    }

    #[tokio::test(start_paused = true)]
    async fn later_hide_replaces_earlier_hide() {
        let banner = StatusBanner::new();
        banner.show("A", BannerColor::Info);
        banner.hide(Duration::from_secs(1));
        banner.hide(Duration::from_secs(10));

        // The first deadline has passed but was replaced.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(banner.state().visible);

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(!banner.state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_subscribers_see_updates() {
        let banner = StatusBanner::new();
        let mut rx = banner.subscribe();

        banner.show("working", BannerColor::Working);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().message, "working");
    }
}
