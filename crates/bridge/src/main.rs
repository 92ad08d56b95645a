//! Headless progress monitor.
//!
//! Probes the queue manager once and, when the deployment runs
//! serverless inference, follows the lifecycle event feed and mirrors
//! every banner update into the structured log. In local mode there is
//! nothing to observe without an embedding host, so the binary reports
//! the mode and exits.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ume_bridge::config::BridgeConfig;
use ume_core::mode::InferenceMode;
use ume_core::prefs::FilePreferences;
use ume_overlay::StatusBanner;
use ume_progress::consumer::ProgressConsumer;
use ume_progress::feed::EventFeed;
use ume_queue::probe::HealthProbe;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BridgeConfig::from_env();
    tracing::info!(queue_url = %config.queue_url, "Starting GPU bridge monitor");

    let report = HealthProbe::new(&config.queue_url).check().await;
    if report.mode == InferenceMode::Local {
        tracing::info!("Queue manager reports local inference, nothing to observe");
        return;
    }

    let banner = StatusBanner::new();
    let prefs = Arc::new(FilePreferences::new(&config.prefs_path));
    let consumer = ProgressConsumer::new(Arc::clone(&banner), prefs, report.worker);
    let feed = EventFeed::new(&config.ws_url);

    let cancel = CancellationToken::new();
    let (events_tx, events_rx) = EventFeed::channel();

    // Mirror banner updates into the log; this binary has no DOM.
    let mut banner_rx = banner.subscribe();
    tokio::spawn(async move {
        while banner_rx.changed().await.is_ok() {
            let state = banner_rx.borrow_and_update().clone();
            if state.visible {
                tracing::info!(message = %state.message, color = state.color.hex(), "Overlay");
            } else {
                tracing::info!("Overlay hidden");
            }
        }
    });

    let feed_task = tokio::spawn(feed.run(events_tx, cancel.child_token()));
    let consumer_task = tokio::spawn(consumer.run(events_rx, cancel.child_token()));

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    cancel.cancel();

    let drain = async {
        let _ = feed_task.await;
        let _ = consumer_task.await;
    };
    if tokio::time::timeout(Duration::from_secs(5), drain).await.is_err() {
        tracing::warn!("Tasks did not stop within 5s, exiting anyway");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
