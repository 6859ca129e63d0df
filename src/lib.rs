//! gstd-host: embedded GStreamer Daemon supervision.
//!
//! Loads the GLib/GStreamer library tiers, prepares the daemon environment
//! from the host's storage directories, and drives `libgstd` through a
//! guarded control bridge.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gstd_host::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! gstd_host::logging::init("info");
//!
//! let config = SupervisorConfig::default();
//! let opener = DylibOpener::from_library_dir(config.library_dir.as_deref());
//! let bridge = GstdBridge::from_config(&config)?;
//! let mut supervisor = Supervisor::new(config, opener, bridge);
//!
//! let boot = supervisor.bootstrap(&DaemonPaths::new("/data/app/cache", "/data/app/files"))?;
//! println!("daemon started: {}", boot.daemon_started);
//! supervisor.shutdown();
//! # Ok(())
//! # }
//! ```

pub use gstd_host_core as core;
pub use gstd_host_native as native;

use gstd_host_core::{Supervisor, SupervisorConfig};
use gstd_host_native::{DylibOpener, GstdBridge, NativeError};

/// Supervisor over the native opener and bridge.
pub type NativeSupervisor = Supervisor<DylibOpener, GstdBridge>;

/// Builds a [`NativeSupervisor`] from `config`.
///
/// Fails if another native bridge is already live in this process.
pub fn native_supervisor(config: SupervisorConfig) -> Result<NativeSupervisor, NativeError> {
    let opener = DylibOpener::from_library_dir(config.library_dir.as_deref());
    let bridge = GstdBridge::from_config(&config)?;
    Ok(Supervisor::new(config, opener, bridge))
}

/// Prelude module for common imports.
pub mod prelude {
    pub use gstd_host_core::{
        BootReport, ControlBridge, DaemonArguments, DaemonController, DaemonPaths, DaemonState,
        HostContext, LibraryLoader, LibraryOpener, ListenerConfig, LoadReport, StartGuard,
        Supervisor, SupervisorConfig, SupervisorError,
    };
    pub use gstd_host_native::{DylibOpener, GstdBridge, NativeError};

    pub use crate::{NativeSupervisor, native_supervisor};
}

/// Log output setup.
pub mod logging {
    use tracing_subscriber::EnvFilter;

    /// Installs a formatted subscriber.
    ///
    /// `RUST_LOG` takes precedence over `default_directive`. Returns `false`
    /// if a global subscriber was already installed.
    pub fn init(default_directive: &str) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .is_ok()
    }
}
