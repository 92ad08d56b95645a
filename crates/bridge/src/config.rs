use std::path::PathBuf;

/// Bridge configuration loaded from environment variables.
///
/// All fields have defaults matching the standard deployment, where
/// the queue manager sits behind the `queue-manager` service name.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Queue manager HTTP base URL.
    pub queue_url: String,
    /// Queue manager WebSocket base URL.
    pub ws_url: String,
    /// Ambient user identity, used when the navigation path carries no
    /// seat segment.
    pub ambient_user_id: Option<String>,
    /// Path of the persisted display-mode preference file.
    pub prefs_path: PathBuf,
    /// Priority attached to every submitted job.
    pub priority: i32,
}

impl BridgeConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                      |
    /// |-----------------------|------------------------------|
    /// | `QUEUE_MANAGER_URL`   | `http://queue-manager:3000`  |
    /// | `QUEUE_MANAGER_WS_URL`| `ws://queue-manager:3000`    |
    /// | `USER_ID`             | (unset)                      |
    /// | `DISPLAY_PREFS_PATH`  | `.ume-display-mode`          |
    /// | `JOB_PRIORITY`        | `1`                          |
    pub fn from_env() -> Self {
        let queue_url = std::env::var("QUEUE_MANAGER_URL")
            .unwrap_or_else(|_| "http://queue-manager:3000".into());

        let ws_url = std::env::var("QUEUE_MANAGER_WS_URL")
            .unwrap_or_else(|_| "ws://queue-manager:3000".into());

        let ambient_user_id = std::env::var("USER_ID").ok().filter(|id| !id.is_empty());

        let prefs_path: PathBuf = std::env::var("DISPLAY_PREFS_PATH")
            .unwrap_or_else(|_| ".ume-display-mode".into())
            .into();

        let priority: i32 = std::env::var("JOB_PRIORITY")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("JOB_PRIORITY must be a valid i32");

        Self {
            queue_url,
            ws_url,
            ambient_user_id,
            prefs_path,
            priority,
        }
    }
}
