//! Control bridge contract.
//!
//! The bridge is the opaque native surface (`init/start/stop/isRunning/getVersion`)
//! through which the daemon is controlled. Every entry point can fail two
//! ways: by returning an error, or abruptly by unwinding. [`Guarded`] folds
//! both into an explicit [`BridgeResult`] at each call site.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

// =============================================================================
// BridgeError
// =============================================================================

/// Bridge entry point, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeOp {
    /// `init(cacheDir, filesDir)`.
    Init,
    /// `start(args)`.
    Start,
    /// `stop()`.
    Stop,
    /// `isRunning()`.
    IsRunning,
    /// `getVersion()`.
    Version,
}

impl fmt::Display for BridgeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::IsRunning => "is_running",
            Self::Version => "version",
        };
        f.write_str(name)
    }
}

/// Error type for bridge calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The entry point reported a failure.
    #[error("bridge {operation} failed: {message}")]
    Failed {
        /// Entry point.
        operation: BridgeOp,
        /// Failure detail.
        message: String,
    },

    /// The entry point unwound instead of returning.
    #[error("bridge {operation} panicked: {message}")]
    Panicked {
        /// Entry point.
        operation: BridgeOp,
        /// Panic payload text.
        message: String,
    },

    /// The native surface is not available (missing library or symbol).
    #[error("bridge unavailable: {0}")]
    Unavailable(String),
}

impl BridgeError {
    /// Creates a failure for `operation`.
    #[must_use]
    pub fn failed(operation: BridgeOp, message: impl Into<String>) -> Self {
        Self::Failed {
            operation,
            message: message.into(),
        }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Returns true if the entry point unwound.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
}

/// Result type for bridge calls.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

// =============================================================================
// ControlBridge
// =============================================================================

/// The daemon's native control surface.
///
/// Implementations use interior mutability; the controller serializes calls
/// by owning the bridge behind `&mut self` operations.
pub trait ControlBridge {
    /// Prepares the daemon environment with two absolute directories.
    fn init(&self, cache_dir: &Path, files_dir: &Path) -> BridgeResult<bool>;

    /// Starts the daemon with the given argument tokens.
    fn start(&self, args: &[String]) -> BridgeResult<bool>;

    /// Stops the daemon.
    fn stop(&self) -> BridgeResult<()>;

    /// Reports whether the daemon is running.
    fn is_running(&self) -> BridgeResult<bool>;

    /// Reports the daemon version string.
    fn version(&self) -> BridgeResult<String>;
}

impl<B: ControlBridge + ?Sized> ControlBridge for Box<B> {
    fn init(&self, cache_dir: &Path, files_dir: &Path) -> BridgeResult<bool> {
        (**self).init(cache_dir, files_dir)
    }

    fn start(&self, args: &[String]) -> BridgeResult<bool> {
        (**self).start(args)
    }

    fn stop(&self) -> BridgeResult<()> {
        (**self).stop()
    }

    fn is_running(&self) -> BridgeResult<bool> {
        (**self).is_running()
    }

    fn version(&self) -> BridgeResult<String> {
        (**self).version()
    }
}

// =============================================================================
// Guarded
// =============================================================================

/// Call-site adapter that converts unwinding into [`BridgeError::Panicked`].
pub struct Guarded<'a, B: ?Sized>(&'a B);

impl<'a, B: ControlBridge + ?Sized> Guarded<'a, B> {
    /// Wraps a bridge reference.
    #[must_use]
    pub const fn new(bridge: &'a B) -> Self {
        Self(bridge)
    }

    /// Guarded `init`.
    pub fn init(&self, cache_dir: &Path, files_dir: &Path) -> BridgeResult<bool> {
        guard(BridgeOp::Init, || self.0.init(cache_dir, files_dir))
    }

    /// Guarded `start`.
    pub fn start(&self, args: &[String]) -> BridgeResult<bool> {
        guard(BridgeOp::Start, || self.0.start(args))
    }

    /// Guarded `stop`.
    pub fn stop(&self) -> BridgeResult<()> {
        guard(BridgeOp::Stop, || self.0.stop())
    }

    /// Guarded `is_running`.
    pub fn is_running(&self) -> BridgeResult<bool> {
        guard(BridgeOp::IsRunning, || self.0.is_running())
    }

    /// Guarded `version`.
    pub fn version(&self) -> BridgeResult<String> {
        guard(BridgeOp::Version, || self.0.version())
    }
}

/// Runs `call`, mapping an unwind into a [`BridgeError::Panicked`] for `operation`.
pub fn guard<T>(operation: BridgeOp, call: impl FnOnce() -> BridgeResult<T>) -> BridgeResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(BridgeError::Panicked {
            operation,
            message: panic_message(payload.as_ref()),
        }),
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PanickingBridge;

    impl ControlBridge for PanickingBridge {
        fn init(&self, _: &Path, _: &Path) -> BridgeResult<bool> {
            panic!("init exploded")
        }

        fn start(&self, _: &[String]) -> BridgeResult<bool> {
            panic!("{}", String::from("start exploded"))
        }

        fn stop(&self) -> BridgeResult<()> {
            std::panic::panic_any(42_u32)
        }

        fn is_running(&self) -> BridgeResult<bool> {
            Err(BridgeError::failed(BridgeOp::IsRunning, "no status"))
        }

        fn version(&self) -> BridgeResult<String> {
            Ok("1.0".to_string())
        }
    }

    #[test]
    fn test_guard_converts_str_panic() {
        let err = Guarded::new(&PanickingBridge)
            .init(Path::new("/c"), Path::new("/f"))
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::Panicked {
                operation: BridgeOp::Init,
                message: "init exploded".to_string(),
            }
        );
        assert!(err.is_panic());
    }

    #[test]
    fn test_guard_converts_string_panic() {
        let err = Guarded::new(&PanickingBridge).start(&[]).unwrap_err();
        assert!(err.to_string().contains("start exploded"));
    }

    #[test]
    fn test_guard_converts_opaque_panic() {
        let err = Guarded::new(&PanickingBridge).stop().unwrap_err();
        assert!(err.to_string().contains("non-string panic payload"));
    }

    #[test]
    fn test_guard_passes_errors_and_values_through() {
        let guarded = Guarded::new(&PanickingBridge);
        let err = guarded.is_running().unwrap_err();
        assert!(!err.is_panic());
        assert_eq!(err.to_string(), "bridge is_running failed: no status");
        assert_eq!(guarded.version().unwrap(), "1.0");
    }

    #[test]
    fn test_boxed_bridge_delegates() {
        let boxed: Box<dyn ControlBridge> = Box::new(PanickingBridge);
        assert_eq!(Guarded::new(&boxed).version().unwrap(), "1.0");
    }
}
