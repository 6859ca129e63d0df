//! Daemon environment initialization.
//!
//! The host supplies two absolute, writable directories valid for the process
//! lifetime. They are captured once and handed to the bridge's `init` entry point.

use std::path::PathBuf;

use crate::bridge::{ControlBridge, Guarded};
use crate::error::SupervisorError;
use crate::types::DaemonPaths;

/// Host-side source of the daemon's storage directories.
pub trait HostContext {
    /// Cache directory (may be purged by the host between runs).
    fn cache_dir(&self) -> PathBuf;

    /// Persistent files directory.
    fn files_dir(&self) -> PathBuf;

    /// Resolves both directories into [`DaemonPaths`].
    fn daemon_paths(&self) -> DaemonPaths {
        DaemonPaths::new(self.cache_dir(), self.files_dir())
    }
}

impl HostContext for DaemonPaths {
    fn cache_dir(&self) -> PathBuf {
        DaemonPaths::cache_dir(self).to_path_buf()
    }

    fn files_dir(&self) -> PathBuf {
        self.storage_dir().to_path_buf()
    }

    fn daemon_paths(&self) -> DaemonPaths {
        self.clone()
    }
}

/// Captured storage paths plus the one-time bridge initialization.
#[derive(Debug, Default)]
pub struct DaemonEnvironment {
    paths: Option<DaemonPaths>,
    attempts: u32,
}

impl DaemonEnvironment {
    /// Creates an environment with nothing captured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths captured by the first initialization attempt.
    #[must_use]
    pub const fn paths(&self) -> Option<&DaemonPaths> {
        self.paths.as_ref()
    }

    /// Number of times `initialize` reached the bridge.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Initializes the daemon environment through `bridge`.
    ///
    /// Any bridge failure, including an unwind, is reported as `Err`; the
    /// caller maps it to `false`. Repeat calls are allowed (retry policy
    /// belongs to the caller) but always reuse the first captured paths.
    pub fn initialize<B: ControlBridge + ?Sized>(
        &mut self,
        bridge: &B,
        paths: DaemonPaths,
    ) -> Result<(), SupervisorError> {
        let paths = self.capture(paths)?;

        tracing::info!("initializing daemon environment");
        tracing::debug!(cache_dir = %paths.cache_dir().display(), "cache dir");
        tracing::debug!(files_dir = %paths.storage_dir().display(), "files dir");

        self.attempts += 1;
        match Guarded::new(bridge).init(paths.cache_dir(), paths.storage_dir()) {
            Ok(true) => Ok(()),
            Ok(false) => Err(SupervisorError::environment_init("bridge init returned false")),
            Err(e) => Err(SupervisorError::environment_init(e.to_string())),
        }
    }

    fn capture(&mut self, paths: DaemonPaths) -> Result<DaemonPaths, SupervisorError> {
        if let Some(captured) = &self.paths {
            if *captured != paths {
                tracing::warn!(
                    captured = ?captured,
                    ignored = ?paths,
                    "daemon paths already captured; ignoring new paths"
                );
            }
            return Ok(captured.clone());
        }

        if !paths.is_absolute() {
            return Err(SupervisorError::environment_init(format!(
                "daemon paths must be absolute (cache: {}, files: {})",
                paths.cache_dir().display(),
                paths.storage_dir().display()
            )));
        }

        self.paths = Some(paths.clone());
        Ok(paths)
    }
}
