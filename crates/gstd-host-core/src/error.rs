//! Error types for gstd-host-core.
//!
//! Lifecycle operations degrade to sentinels (`false`, `"unknown"`) so the
//! host process never sees a native failure. These types describe *why* a
//! stage failed, for logs and for [`Supervisor::bootstrap`](crate::Supervisor::bootstrap).

/// Result type alias for supervisor operations.
pub type Result<T> = std::result::Result<T, SupervisorError>;

/// Failure taxonomy of the bootstrap and lifecycle sequence.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// A required library failed to load; remaining tiers were not attempted.
    #[error("required library '{identifier}' failed to load: {reason}")]
    RequiredLibraryLoad {
        /// Library identifier.
        identifier: String,
        /// Loader error text.
        reason: String,
    },

    /// An optional library failed to load. Recovered locally.
    #[error("optional library '{identifier}' failed to load: {reason}")]
    OptionalLibraryLoad {
        /// Library identifier.
        identifier: String,
        /// Loader error text.
        reason: String,
    },

    /// Daemon environment initialization failed.
    #[error("environment initialization failed: {0}")]
    EnvironmentInit(String),

    /// Daemon start failed.
    #[error("daemon start failed: {0}")]
    DaemonStart(String),

    /// Daemon stop failed. Never surfaced from `stop()`, only logged.
    #[error("daemon stop failed: {0}")]
    DaemonStop(String),

    /// Status or version query failed.
    #[error("daemon query failed: {0}")]
    Query(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SupervisorError {
    /// Creates a required-library error.
    #[must_use]
    pub fn required_library(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RequiredLibraryLoad {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Creates an optional-library error.
    #[must_use]
    pub fn optional_library(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OptionalLibraryLoad {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Creates an environment initialization error.
    #[must_use]
    pub fn environment_init(msg: impl Into<String>) -> Self {
        Self::EnvironmentInit(msg.into())
    }

    /// Creates a daemon start error.
    #[must_use]
    pub fn daemon_start(msg: impl Into<String>) -> Self {
        Self::DaemonStart(msg.into())
    }

    /// Creates a daemon stop error.
    #[must_use]
    pub fn daemon_stop(msg: impl Into<String>) -> Self {
        Self::DaemonStop(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if the failure is recovered locally and never aborts bootstrap.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::OptionalLibraryLoad { .. } | Self::DaemonStop(_) | Self::Query(_)
        )
    }

    /// Returns true if the failure aborts progression to the next bootstrap stage.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RequiredLibraryLoad { .. }
                | Self::EnvironmentInit(_)
                | Self::Config(_)
                | Self::Io(_)
        )
    }
}
