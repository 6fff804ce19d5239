//! Tree configuration.
//!
//! Configuration can be constructed programmatically or loaded from the
//! environment with [`TreeConfig::from_env`].

use std::env;
use std::path::{Path, PathBuf};

/// Target platform. Some descriptors only affect layout on one of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    #[default]
    Android,
    Ios,
}

impl Platform {
    /// Parse `android` or `ios`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("android") {
            Some(Self::Android)
        } else if trimmed.eq_ignore_ascii_case("ios") {
            Some(Self::Ios)
        } else {
            None
        }
    }
}

/// Runtime configuration of a [`crate::ViewTree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Directory that `~/` in stylesheet paths refers to.
    pub app_root: PathBuf,
    pub platform: Platform,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("."), Platform::default())
    }
}

impl TreeConfig {
    #[inline]
    #[must_use]
    pub const fn new(app_root: PathBuf, platform: Platform) -> Self {
        Self { app_root, platform }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads:
    /// - `VIEW_APP_ROOT`: application root directory (default: `.`)
    /// - `VIEW_PLATFORM`: `android` or `ios` (default: android)
    #[must_use]
    pub fn from_env() -> Self {
        let app_root = env::var("VIEW_APP_ROOT")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let platform = env::var("VIEW_PLATFORM")
            .ok()
            .and_then(|val| Platform::parse(&val))
            .unwrap_or_default();
        Self { app_root, platform }
    }

    /// Resolve a stylesheet path. A leading `~/` is relative to `app_root`.
    pub fn resolve_app_path(&self, path: &str) -> PathBuf {
        path.strip_prefix("~/")
            .map_or_else(|| Path::new(path).to_path_buf(), |rest| self.app_root.join(rest))
    }
}
