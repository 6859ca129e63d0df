//! Error types for the native layer.

use gstd_host_core::{BridgeError, BridgeOp, LoadError};

/// Result type for native operations.
pub type Result<T> = std::result::Result<T, NativeError>;

/// Error type for native library and daemon entry point access.
#[derive(Debug, thiserror::Error)]
pub enum NativeError {
    /// No shared object exists at the resolved path.
    #[error("library not found: {0}")]
    NotFound(String),

    /// The dynamic linker refused to open the library.
    #[error("failed to open {library}: {source}")]
    Open {
        /// Resolved file name or path.
        library: String,
        /// Linker error.
        #[source]
        source: libloading::Error,
    },

    /// A required entry point is not exported.
    #[error("symbol {symbol} not found: {source}")]
    Symbol {
        /// Symbol name.
        symbol: &'static str,
        /// Linker error.
        #[source]
        source: libloading::Error,
    },

    /// An argument contains an interior NUL byte.
    #[error("argument contains NUL byte: {0:?}")]
    Argument(String),

    /// Another bridge is already live in this process.
    #[error("a GstdBridge is already live in this process")]
    AlreadyAcquired,

    /// The daemon thread could not be spawned.
    #[error("failed to spawn daemon thread: {0}")]
    Thread(#[from] std::io::Error),
}

impl NativeError {
    /// Converts into a bridge error for `operation`.
    #[must_use]
    pub fn into_bridge(self, operation: BridgeOp) -> BridgeError {
        match self {
            Self::NotFound(_) | Self::Open { .. } | Self::Symbol { .. } => {
                BridgeError::unavailable(self.to_string())
            }
            other => BridgeError::failed(operation, other.to_string()),
        }
    }
}

impl From<NativeError> for LoadError {
    fn from(err: NativeError) -> Self {
        match err {
            NativeError::NotFound(path) => Self::NotFound(path),
            other => Self::link(other.to_string()),
        }
    }
}
