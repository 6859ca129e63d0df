//! Mock bridge and opener for lifecycle tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::bridge::{BridgeError, BridgeOp, BridgeResult, ControlBridge};
use crate::loader::{LibraryOpener, LoadError};

/// How a mocked bridge entry point behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Return the successful value.
    Succeed,
    /// Return `Ok(false)` (only meaningful for `init`/`start`).
    ReturnFalse,
    /// Return `Err`.
    Error,
    /// Unwind.
    Panic,
}

/// Mock control bridge.
///
/// Clones share state, so a test can keep one clone for assertions while
/// the controller owns the other.
#[derive(Clone, Default)]
pub struct MockBridge {
    state: Arc<MockState>,
}

struct MockState {
    init: parking_lot::RwLock<Behavior>,
    start: parking_lot::RwLock<Behavior>,
    stop: parking_lot::RwLock<Behavior>,
    is_running: parking_lot::RwLock<Behavior>,
    version: parking_lot::RwLock<Behavior>,

    version_string: parking_lot::RwLock<String>,
    running: AtomicBool,

    init_count: AtomicU32,
    start_count: AtomicU32,
    stop_count: AtomicU32,

    last_args: parking_lot::RwLock<Vec<String>>,
    last_init: parking_lot::RwLock<Option<(PathBuf, PathBuf)>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            init: parking_lot::RwLock::new(Behavior::Succeed),
            start: parking_lot::RwLock::new(Behavior::Succeed),
            stop: parking_lot::RwLock::new(Behavior::Succeed),
            is_running: parking_lot::RwLock::new(Behavior::Succeed),
            version: parking_lot::RwLock::new(Behavior::Succeed),
            version_string: parking_lot::RwLock::new("0.15.2".to_string()),
            running: AtomicBool::new(false),
            init_count: AtomicU32::new(0),
            start_count: AtomicU32::new(0),
            stop_count: AtomicU32::new(0),
            last_args: parking_lot::RwLock::new(Vec::new()),
            last_init: parking_lot::RwLock::new(None),
        }
    }
}

impl MockBridge {
    /// Creates a bridge where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures `init`.
    #[must_use]
    pub fn with_init(self, behavior: Behavior) -> Self {
        self.set_init(behavior);
        self
    }

    /// Configures `start`.
    #[must_use]
    pub fn with_start(self, behavior: Behavior) -> Self {
        self.set_start(behavior);
        self
    }

    /// Configures `stop`.
    #[must_use]
    pub fn with_stop(self, behavior: Behavior) -> Self {
        *self.state.stop.write() = behavior;
        self
    }

    /// Configures `is_running`.
    #[must_use]
    pub fn with_is_running(self, behavior: Behavior) -> Self {
        *self.state.is_running.write() = behavior;
        self
    }

    /// Configures `version`.
    #[must_use]
    pub fn with_version(self, behavior: Behavior) -> Self {
        *self.state.version.write() = behavior;
        self
    }

    /// Sets the version string returned on success.
    #[must_use]
    pub fn with_version_string(self, version: impl Into<String>) -> Self {
        *self.state.version_string.write() = version.into();
        self
    }

    /// Changes `init` behavior after construction.
    pub fn set_init(&self, behavior: Behavior) {
        *self.state.init.write() = behavior;
    }

    /// Changes `start` behavior after construction.
    pub fn set_start(&self, behavior: Behavior) {
        *self.state.start.write() = behavior;
    }

    /// Number of `init` calls.
    pub fn init_count(&self) -> u32 {
        self.state.init_count.load(Ordering::SeqCst)
    }

    /// Number of `start` calls.
    pub fn start_count(&self) -> u32 {
        self.state.start_count.load(Ordering::SeqCst)
    }

    /// Number of `stop` calls.
    pub fn stop_count(&self) -> u32 {
        self.state.stop_count.load(Ordering::SeqCst)
    }

    /// Arguments of the last `start` call.
    pub fn last_args(&self) -> Vec<String> {
        self.state.last_args.read().clone()
    }

    /// Paths of the last `init` call.
    pub fn last_init(&self) -> Option<(PathBuf, PathBuf)> {
        self.state.last_init.read().clone()
    }

    /// Whether the mock daemon is running.
    pub fn running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }
}

fn act<T>(op: BridgeOp, behavior: Behavior, ok: T, falsy: T) -> BridgeResult<T> {
    match behavior {
        Behavior::Succeed => Ok(ok),
        Behavior::ReturnFalse => Ok(falsy),
        Behavior::Error => Err(BridgeError::failed(op, "mock failure")),
        Behavior::Panic => panic!("mock {op} panicked"),
    }
}

impl ControlBridge for MockBridge {
    fn init(&self, cache_dir: &Path, files_dir: &Path) -> BridgeResult<bool> {
        self.state.init_count.fetch_add(1, Ordering::SeqCst);
        *self.state.last_init.write() = Some((cache_dir.to_path_buf(), files_dir.to_path_buf()));
        act(BridgeOp::Init, *self.state.init.read(), true, false)
    }

    fn start(&self, args: &[String]) -> BridgeResult<bool> {
        self.state.start_count.fetch_add(1, Ordering::SeqCst);
        *self.state.last_args.write() = args.to_vec();
        let started = act(BridgeOp::Start, *self.state.start.read(), true, false)?;
        if started {
            self.state.running.store(true, Ordering::SeqCst);
        }
        Ok(started)
    }

    fn stop(&self) -> BridgeResult<()> {
        self.state.stop_count.fetch_add(1, Ordering::SeqCst);
        act(BridgeOp::Stop, *self.state.stop.read(), (), ())?;
        self.state.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> BridgeResult<bool> {
        let running = self.running();
        act(BridgeOp::IsRunning, *self.state.is_running.read(), running, false)
    }

    fn version(&self) -> BridgeResult<String> {
        let version = self.state.version_string.read().clone();
        act(BridgeOp::Version, *self.state.version.read(), version, String::new())
    }
}

/// Mock library opener that fails for configured identifiers.
#[derive(Debug, Default)]
pub struct MockOpener {
    missing: Vec<String>,
    opened: Vec<String>,
    attempts: Vec<String>,
}

impl MockOpener {
    /// Creates an opener where every library loads.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `identifier` fail to load.
    #[must_use]
    pub fn missing(mut self, identifier: impl Into<String>) -> Self {
        self.missing.push(identifier.into());
        self
    }

    /// Libraries opened successfully, in order.
    pub fn opened(&self) -> &[String] {
        &self.opened
    }

    /// Every identifier attempted, in order.
    pub fn attempts(&self) -> &[String] {
        &self.attempts
    }
}

impl LibraryOpener for MockOpener {
    fn open(&mut self, identifier: &str) -> Result<(), LoadError> {
        self.attempts.push(identifier.to_string());
        if self.missing.iter().any(|m| m == identifier) {
            return Err(LoadError::NotFound(format!("lib{identifier}.so")));
        }
        self.opened.push(identifier.to_string());
        Ok(())
    }
}
