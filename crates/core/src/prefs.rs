//! Persisted display-mode preference.
//!
//! The overlay's verbosity is controlled by a session preference the
//! operator can flip outside the normal UI. Consumers must re-read it
//! on every render decision so a mid-job toggle takes effect on the
//! next tick.

use std::path::PathBuf;
use std::sync::RwLock;

/// Verbosity for rendered progress messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Plain status messages; raw diagnostics never leak.
    #[default]
    User,
    /// Operator detail: job ids, worker identity, raw exception text.
    Admin,
}

impl DisplayMode {
    /// Parse the persisted preference value.
    ///
    /// Only the literal `"admin"` opts in to diagnostics; any other
    /// value, or no value at all, stays `User`.
    pub fn from_pref(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("admin") => Self::Admin,
            _ => Self::User,
        }
    }
}

/// Source of the persisted display preference.
///
/// Implementations must consult the backing store on every call rather
/// than caching at subscription time.
pub trait PreferenceStore: Send + Sync {
    fn display_mode(&self) -> DisplayMode;
}

/// Preference file read on every lookup.
///
/// The file holds the literal string `user` or `admin`. A missing or
/// unreadable file means `User`.
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FilePreferences {
    fn display_mode(&self) -> DisplayMode {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => DisplayMode::from_pref(Some(&raw)),
            Err(_) => DisplayMode::User,
        }
    }
}

/// In-memory preference, togglable at runtime.
///
/// For embedding hosts that keep the preference in their own session
/// state, and for tests.
#[derive(Default)]
pub struct SharedPreferences {
    mode: RwLock<DisplayMode>,
}

impl SharedPreferences {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            mode: RwLock::new(mode),
        }
    }

    pub fn set(&self, mode: DisplayMode) {
        *self.mode.write().expect("preference lock") = mode;
    }
}

impl PreferenceStore for SharedPreferences {
    fn display_mode(&self) -> DisplayMode {
        *self.mode.read().expect("preference lock")
    }
}
