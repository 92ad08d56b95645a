//! Session activation: probe once, then wire exactly one side.
//!
//! The probe result is taken at session setup and never revisited. A
//! local session gets the submission interceptor; a serverless session
//! gets the event feed plus progress consumer and leaves the host's
//! native submission path untouched.

use std::sync::Arc;

use ume_core::graph::GraphSource;
use ume_core::identity::derive_user_id;
use ume_core::mode::InferenceMode;
use ume_core::prefs::PreferenceStore;
use ume_overlay::StatusBanner;
use ume_progress::consumer::ProgressConsumer;
use ume_progress::feed::EventFeed;
use ume_queue::api::QueueApi;
use ume_queue::probe::HealthProbe;
use ume_queue::redirect::QueueRedirect;

use crate::config::BridgeConfig;

/// What the session resolved to. Exactly one variant is ever live.
pub enum Activation {
    /// Local inference: the host's submission path is replaced.
    Intercept(QueueRedirect),
    /// Serverless inference: submissions run elsewhere; this session
    /// only observes and renders.
    Observe {
        consumer: ProgressConsumer,
        feed: EventFeed,
    },
}

/// Probe the queue manager once and build the active side.
///
/// `nav_path` is the session's navigation path, used to derive the
/// submitting user id in local mode.
pub async fn activate(
    config: &BridgeConfig,
    banner: Arc<StatusBanner>,
    prefs: Arc<dyn PreferenceStore>,
    graph: Arc<dyn GraphSource>,
    nav_path: &str,
) -> Activation {
    let report = HealthProbe::new(&config.queue_url).check().await;

    match report.mode {
        InferenceMode::Local => {
            let user_id = derive_user_id(nav_path, config.ambient_user_id.as_deref());
            tracing::info!(%user_id, "Activating submission interception");
            Activation::Intercept(QueueRedirect::new(
                QueueApi::new(&config.queue_url),
                graph,
                banner,
                user_id,
                config.priority,
            ))
        }
        InferenceMode::Serverless => {
            tracing::info!(worker = ?report.worker, "Activating progress observation");
            Activation::Observe {
                consumer: ProgressConsumer::new(banner, prefs, report.worker),
                feed: EventFeed::new(&config.ws_url),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use ume_core::graph::GraphError;
    use ume_core::prefs::SharedPreferences;
    use ume_core::types::ExecutionPayload;

    struct NoGraph;

    #[async_trait]
    impl GraphSource for NoGraph {
        async fn graph_to_prompt(&self) -> Result<ExecutionPayload, GraphError> {
            Ok(serde_json::json!({}))
        }
    }

    async fn spawn_health(body: serde_json::Value) -> String {
        use axum::{routing::get, Json, Router};

        let app = Router::new().route(
            "/api/health",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config(queue_url: String) -> BridgeConfig {
        BridgeConfig {
            queue_url,
            ws_url: "ws://127.0.0.1:9".into(),
            ambient_user_id: Some("ambient".into()),
            prefs_path: PathBuf::from(".ume-display-mode"),
            priority: 1,
        }
    }

    async fn activate_against(body: serde_json::Value) -> Activation {
        let url = spawn_health(body).await;
        activate(
            &config(url),
            StatusBanner::new(),
            Arc::new(SharedPreferences::default()),
            Arc::new(NoGraph),
            "/user007/graph",
        )
        .await
    }

    #[tokio::test]
    async fn local_mode_intercepts_submissions() {
        let activation = activate_against(serde_json::json!({
            "inference_mode": "local"
        }))
        .await;
        assert!(matches!(activation, Activation::Intercept(_)));
    }

    #[tokio::test]
    async fn serverless_mode_observes_progress() {
        let activation = activate_against(serde_json::json!({
            "inference_mode": "serverless",
            "active_gpu": "gpu-1",
            "serverless_endpoint": "ep-abc"
        }))
        .await;
        assert!(matches!(activation, Activation::Observe { .. }));
    }

    #[tokio::test]
    async fn unreachable_queue_manager_falls_back_to_interception() {
        // Bind-then-drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let activation = activate(
            &config(url),
            StatusBanner::new(),
            Arc::new(SharedPreferences::default()),
            Arc::new(NoGraph),
            "/user007/graph",
        )
        .await;
        assert!(matches!(activation, Activation::Intercept(_)));
    }
}
