//! GStreamer process environment.

use std::path::{Path, PathBuf};

/// Registry cache location.
pub const GST_REGISTRY: &str = "GST_REGISTRY";
/// Plugin scanner location.
pub const GST_PLUGIN_SCANNER: &str = "GST_PLUGIN_SCANNER";
/// Plugin search path.
pub const GST_PLUGIN_PATH: &str = "GST_PLUGIN_PATH";

/// Environment variables GStreamer reads at startup, derived from the host's
/// storage directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GstEnvironment {
    registry: PathBuf,
    plugin_scanner: PathBuf,
    plugin_path: PathBuf,
}

impl GstEnvironment {
    /// Derives the variables from the cache and files directories.
    ///
    /// Plugins live in the `lib` directory next to `files_dir`.
    #[must_use]
    pub fn new(cache_dir: &Path, files_dir: &Path) -> Self {
        Self {
            registry: cache_dir.to_path_buf(),
            plugin_scanner: files_dir.to_path_buf(),
            plugin_path: files_dir.join("..").join("lib"),
        }
    }

    /// The variables as name/value pairs.
    #[must_use]
    pub fn vars(&self) -> [(&'static str, &Path); 3] {
        [
            (GST_REGISTRY, self.registry.as_path()),
            (GST_PLUGIN_SCANNER, self.plugin_scanner.as_path()),
            (GST_PLUGIN_PATH, self.plugin_path.as_path()),
        ]
    }

    /// Writes the variables into the process environment.
    pub fn apply(&self) {
        for (key, value) in self.vars() {
            // SAFETY: only called from `GstdBridge::init`, which holds the
            // bridge lock and refuses while a daemon thread is alive, so no
            // gstd thread reads the environment concurrently.
            unsafe { std::env::set_var(key, value) };
            tracing::debug!(key, value = %value.display(), "environment set");
        }
    }
}
