//! [`ControlBridge`] over `libgstd`.
//!
//! The daemon runs `gstd_start` on a dedicated thread and blocks there until
//! `gstd_stop` is called. One bridge may be live per process, matching the
//! process-global state inside `libgstd`.

use std::ffi::{CString, c_char, c_int};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gstd_host_core::{BridgeError, BridgeOp, BridgeResult, ControlBridge, SupervisorConfig};
use libloading::Library;
use parking_lot::Mutex;

use crate::env::GstEnvironment;
use crate::error::{NativeError, Result};
use crate::opener::open_library;
use crate::symbols::GstdSymbols;

/// Library exporting the daemon entry points.
pub const GSTD_LIBRARY: &str = "gstd";

static LIVE: AtomicBool = AtomicBool::new(false);

#[derive(Default)]
struct Inner {
    library: Option<Arc<Library>>,
    symbols: Option<GstdSymbols>,
    thread: Option<JoinHandle<c_int>>,
}

/// Native control bridge for the embedded GStreamer Daemon.
pub struct GstdBridge {
    library_dir: Option<PathBuf>,
    startup_grace: Duration,
    running: Arc<AtomicBool>,
    inner: Mutex<Inner>,
}

impl GstdBridge {
    /// Claims the process-wide bridge.
    ///
    /// Fails with [`NativeError::AlreadyAcquired`] while another bridge is
    /// live. Dropping the bridge stops the daemon and releases the claim.
    pub fn acquire(library_dir: Option<&Path>, startup_grace: Duration) -> Result<Self> {
        if LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(NativeError::AlreadyAcquired);
        }
        Ok(Self {
            library_dir: library_dir.map(Path::to_path_buf),
            startup_grace,
            running: Arc::new(AtomicBool::new(false)),
            inner: Mutex::new(Inner::default()),
        })
    }

    /// Claims the bridge with the library directory and grace period from `config`.
    pub fn from_config(config: &SupervisorConfig) -> Result<Self> {
        Self::acquire(config.library_dir.as_deref(), config.startup_grace)
    }

    /// Time `start` waits before confirming the daemon thread survived.
    #[must_use]
    pub const fn startup_grace(&self) -> Duration {
        self.startup_grace
    }

    fn symbols(&self, inner: &mut Inner) -> Result<GstdSymbols> {
        if let Some(symbols) = inner.symbols {
            return Ok(symbols);
        }
        let library = open_library(self.library_dir.as_deref(), GSTD_LIBRARY)?;
        let symbols = GstdSymbols::resolve(&library)?;
        inner.library = Some(Arc::new(library));
        inner.symbols = Some(symbols);
        Ok(symbols)
    }

    fn spawn_daemon(&self, inner: &mut Inner, args: &[String]) -> Result<bool> {
        let symbols = self.symbols(inner)?;
        let argv = args
            .iter()
            .map(|arg| CString::new(arg.as_str()).map_err(|_| NativeError::Argument(arg.clone())))
            .collect::<Result<Vec<_>>>()?;
        let library = inner.library.clone();
        let running = Arc::clone(&self.running);

        running.store(true, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name("gstd".to_string())
            .spawn(move || {
                let _library = library;
                let mut ptrs: Vec<*mut c_char> =
                    argv.iter().map(|a| a.as_ptr().cast_mut()).collect();
                let argc = c_int::try_from(argv.len()).unwrap_or(c_int::MAX);
                ptrs.push(std::ptr::null_mut());
                // SAFETY: argv holds `argc` valid NUL-terminated strings plus a
                // null terminator, all alive until gstd_start returns; the
                // library handle is kept alive by `_library`.
                let code = unsafe { (symbols.start)(argc, ptrs.as_mut_ptr()) };
                running.store(false, Ordering::SeqCst);
                code
            });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        thread::sleep(self.startup_grace);
        if handle.is_finished() {
            let code = handle.join().unwrap_or(-1);
            self.running.store(false, Ordering::SeqCst);
            tracing::error!(code, "gstd_start returned during startup");
            return Ok(false);
        }
        inner.thread = Some(handle);
        Ok(true)
    }

    fn halt(&self, inner: &mut Inner) -> BridgeResult<()> {
        let Some(handle) = inner.thread.take() else {
            self.running.store(false, Ordering::SeqCst);
            return Ok(());
        };
        if !handle.is_finished() {
            if let Some(symbols) = inner.symbols {
                // SAFETY: the library is loaded and the daemon thread is live.
                unsafe { (symbols.stop)() };
            }
        }
        let joined = handle.join();
        self.running.store(false, Ordering::SeqCst);
        match joined {
            Ok(code) => {
                tracing::debug!(code, "daemon thread exited");
                Ok(())
            }
            Err(_) => Err(BridgeError::failed(BridgeOp::Stop, "daemon thread panicked")),
        }
    }
}

impl ControlBridge for GstdBridge {
    fn init(&self, cache_dir: &Path, files_dir: &Path) -> BridgeResult<bool> {
        let inner = self.inner.lock();
        if inner.thread.as_ref().is_some_and(|t| !t.is_finished()) {
            tracing::warn!("cannot initialize environment while gstd is running");
            return Ok(false);
        }
        GstEnvironment::new(cache_dir, files_dir).apply();
        tracing::info!("GStreamer environment initialized");
        Ok(true)
    }

    fn start(&self, args: &[String]) -> BridgeResult<bool> {
        let mut inner = self.inner.lock();
        if inner.thread.as_ref().is_some_and(|t| !t.is_finished()) {
            tracing::warn!("gstd is already running");
            return Ok(false);
        }
        if let Some(finished) = inner.thread.take() {
            match finished.join() {
                Ok(code) => tracing::debug!(code, "previous daemon thread exited"),
                Err(_) => tracing::warn!("previous daemon thread panicked"),
            }
        }
        self.spawn_daemon(&mut inner, args)
            .map_err(|e| e.into_bridge(BridgeOp::Start))
    }

    fn stop(&self) -> BridgeResult<()> {
        let mut inner = self.inner.lock();
        self.halt(&mut inner)
    }

    fn is_running(&self) -> BridgeResult<bool> {
        Ok(self.running.load(Ordering::SeqCst))
    }

    fn version(&self) -> BridgeResult<String> {
        let mut inner = self.inner.lock();
        self.symbols(&mut inner)
            .map(|symbols| symbols.version_string())
            .map_err(|e| e.into_bridge(BridgeOp::Version))
    }
}

impl Drop for GstdBridge {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if inner.thread.is_some() {
            let mut taken = std::mem::take(inner);
            if let Err(e) = self.halt(&mut taken) {
                tracing::error!(error = %e, "error stopping gstd on drop");
            }
        }
        LIVE.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for GstdBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GstdBridge")
            .field("library_dir", &self.library_dir)
            .field("startup_grace", &self.startup_grace)
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
