//! Supervisor - the host-facing owner of the bootstrap sequence.
//!
//! Load → initialize → start, each stage gating the next. Created once on
//! host startup and torn down explicitly with [`Supervisor::shutdown`]; if
//! the host drops it instead, the same teardown runs from `Drop`.

use serde::Serialize;

use crate::bridge::ControlBridge;
use crate::config::SupervisorConfig;
use crate::controller::DaemonController;
use crate::environment::HostContext;
use crate::error::{Result, SupervisorError};
use crate::loader::{LibraryLoader, LibraryOpener};
use crate::types::{BootId, DaemonState, LoadReport};

/// Summary of a completed bootstrap.
#[derive(Debug, Clone, Serialize)]
pub struct BootReport {
    /// Attempt identifier (also on every log line of the attempt).
    pub boot_id: BootId,
    /// Library load outcomes.
    pub load: LoadReport,
    /// Whether the daemon reached `Running`.
    pub daemon_started: bool,
    /// HTTP API endpoint, when started with HTTP enabled.
    pub http_endpoint: Option<String>,
    /// TCP client endpoint, when started with TCP enabled.
    pub tcp_endpoint: Option<String>,
}

/// Owns the loader and the controller for the lifetime of the host.
pub struct Supervisor<O: LibraryOpener, B: ControlBridge> {
    // Dropped before `loader` so the bridge releases the daemon before
    // the opener releases its library handles.
    controller: DaemonController<B>,
    loader: LibraryLoader<O>,
    config: SupervisorConfig,
    shut_down: bool,
}

impl<O: LibraryOpener, B: ControlBridge> Supervisor<O, B> {
    /// Creates a supervisor. Nothing is loaded until [`Self::bootstrap`].
    #[must_use]
    pub fn new(config: SupervisorConfig, opener: O, bridge: B) -> Self {
        let controller = DaemonController::new(bridge).with_start_guard(config.start_guard);
        Self {
            controller,
            loader: LibraryLoader::new(opener),
            config,
            shut_down: false,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// The daemon controller.
    #[must_use]
    pub const fn controller(&self) -> &DaemonController<B> {
        &self.controller
    }

    /// The daemon controller, for stop/start after bootstrap.
    pub fn controller_mut(&mut self) -> &mut DaemonController<B> {
        &mut self.controller
    }

    /// The library loader.
    #[must_use]
    pub const fn loader(&self) -> &LibraryLoader<O> {
        &self.loader
    }

    /// Current daemon state.
    #[must_use]
    pub const fn state(&self) -> DaemonState {
        self.controller.state()
    }

    /// Runs the bootstrap sequence.
    ///
    /// A required library failure or an environment failure aborts with an
    /// error. A daemon start failure does not: the host keeps running and
    /// the report carries `daemon_started = false`.
    pub fn bootstrap<H: HostContext + ?Sized>(&mut self, host: &H) -> Result<BootReport> {
        let boot_id = BootId::new();
        let span = tracing::info_span!("bootstrap", boot = %boot_id);
        let _enter = span.enter();

        let load = self.loader.load(&self.config.tiers);
        if !self.controller.record_load(&load) {
            let (identifier, reason) = load
                .required_failure()
                .map(|o| (o.identifier.clone(), o.error.clone().unwrap_or_default()))
                .unwrap_or_default();
            tracing::error!("failed to load native libraries");
            return Err(SupervisorError::required_library(identifier, reason));
        }
        tracing::info!(
            loaded = load.loaded_count(),
            skipped = load.failures().count(),
            "native libraries loaded"
        );

        if let Err(e) = self.controller.try_initialize(host.daemon_paths()) {
            tracing::error!(error = %e, "failed to initialize daemon environment");
            return Err(e);
        }

        let listeners = &self.config.listeners;
        let daemon_started = self.controller.start_with_listeners(listeners);
        let (http_endpoint, tcp_endpoint) = if daemon_started {
            (listeners.http_endpoint(), listeners.tcp_endpoint())
        } else {
            (None, None)
        };

        if daemon_started {
            tracing::info!(version = %self.controller.version(), "GStreamer Daemon started successfully");
            if let Some(http) = &http_endpoint {
                tracing::info!("HTTP API: {http}");
            }
            if let Some(tcp) = &tcp_endpoint {
                tracing::info!("TCP client: {tcp}");
            }
        } else {
            tracing::error!("failed to start GStreamer Daemon");
        }

        Ok(BootReport {
            boot_id,
            load,
            daemon_started,
            http_endpoint,
            tcp_endpoint,
        })
    }

    fn teardown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        if self.controller.is_running() {
            tracing::info!("stopping GStreamer Daemon");
            self.controller.stop();
        }
    }

    /// Stops the daemon if it reports running and releases everything.
    pub fn shutdown(mut self) -> DaemonState {
        self.teardown();
        self.controller.state()
    }
}

impl<O: LibraryOpener, B: ControlBridge> Drop for Supervisor<O, B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<O: LibraryOpener, B: ControlBridge> std::fmt::Debug for Supervisor<O, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("state", &self.controller.state())
            .field("tiers", &self.config.tiers.len())
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}
