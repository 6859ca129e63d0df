//! Daemon controller - owns the daemon state machine.
//!
//! Every bridge call goes through [`Guarded`], so no native failure escapes:
//! `start` and `initialize` report `false`, `stop` swallows, queries fall back
//! to `false` / [`UNKNOWN_VERSION`].

use crate::bridge::{ControlBridge, Guarded};
use crate::config::{ListenerConfig, StartGuard};
use crate::environment::DaemonEnvironment;
use crate::error::{Result, SupervisorError};
use crate::types::{DaemonArguments, DaemonPaths, DaemonState, LoadReport};

/// Version reported when the bridge cannot be queried.
pub const UNKNOWN_VERSION: &str = "unknown";

/// The fixed startup arguments: loopback-only HTTP on 8080 and TCP from 5000, quiet.
#[must_use]
pub fn default_arguments() -> DaemonArguments {
    DaemonArguments::new([
        "gstd",
        "--enable-http-protocol",
        "--http-address=127.0.0.1",
        "--http-port=8080",
        "--enable-tcp-protocol",
        "--tcp-address=127.0.0.1",
        "--tcp-base-port=5000",
        "-q",
    ])
}

/// Owns the daemon run state and mediates every bridge call.
///
/// One controller exists per daemon. Mutating operations take `&mut self`,
/// which serializes lifecycle calls at compile time.
#[derive(Debug)]
pub struct DaemonController<B> {
    bridge: B,
    state: DaemonState,
    environment: DaemonEnvironment,
    start_guard: StartGuard,
}

impl<B: ControlBridge> DaemonController<B> {
    /// Creates a controller in [`DaemonState::Unloaded`].
    #[must_use]
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            state: DaemonState::Unloaded,
            environment: DaemonEnvironment::new(),
            start_guard: StartGuard::default(),
        }
    }

    /// Sets the policy for `start` while running.
    #[must_use]
    pub fn with_start_guard(mut self, guard: StartGuard) -> Self {
        self.start_guard = guard;
        self
    }

    /// The fixed startup arguments.
    #[must_use]
    pub fn default_arguments() -> DaemonArguments {
        default_arguments()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> DaemonState {
        self.state
    }

    /// Start-while-running policy.
    #[must_use]
    pub const fn start_guard(&self) -> StartGuard {
        self.start_guard
    }

    /// The environment, with its captured paths.
    #[must_use]
    pub const fn environment(&self) -> &DaemonEnvironment {
        &self.environment
    }

    /// The bridge.
    #[must_use]
    pub const fn bridge(&self) -> &B {
        &self.bridge
    }

    fn transition(&mut self, next: DaemonState) {
        if self.state != next {
            tracing::debug!(old = ?self.state, new = ?next, "daemon state changed");
        }
        self.state = next;
    }

    /// Applies a library load report. Returns the report's overall success.
    pub fn record_load(&mut self, report: &LoadReport) -> bool {
        if report.overall_success {
            if self.state == DaemonState::Unloaded {
                self.transition(DaemonState::LibrariesLoaded);
            }
        } else {
            tracing::error!(
                library = report.required_failure().map_or("?", |o| o.identifier.as_str()),
                "required library missing; daemon stays unloaded"
            );
        }
        report.overall_success
    }

    /// Initializes the daemon environment, reporting why it failed.
    ///
    /// On failure the state does not advance.
    pub fn try_initialize(&mut self, paths: DaemonPaths) -> Result<()> {
        if !self.state.can_initialize() {
            return Err(SupervisorError::environment_init(format!(
                "cannot initialize from state {}",
                self.state
            )));
        }
        self.environment.initialize(&self.bridge, paths)?;
        self.transition(DaemonState::Initialized);
        Ok(())
    }

    /// Initializes the daemon environment. Returns `false` on any failure.
    pub fn initialize(&mut self, paths: DaemonPaths) -> bool {
        match self.try_initialize(paths) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, state = %self.state, "failed to initialize daemon environment");
                false
            }
        }
    }

    /// Starts the daemon, reporting why it failed.
    pub fn try_start(&mut self, args: &DaemonArguments) -> Result<()> {
        match self.state {
            DaemonState::Running => match self.start_guard {
                StartGuard::Reject => {
                    return Err(SupervisorError::daemon_start("daemon already running"));
                }
                StartGuard::Restart => {
                    tracing::info!("restarting running daemon");
                    self.stop();
                }
                StartGuard::Reinvoke => {
                    tracing::debug!("daemon already running; invoking bridge start again");
                }
            },
            state if state.can_start() => {}
            state => {
                return Err(SupervisorError::daemon_start(format!(
                    "cannot start from state {state}"
                )));
            }
        }

        tracing::info!("starting daemon");
        tracing::debug!(arguments = %args, "daemon arguments");

        match Guarded::new(&self.bridge).start(args.as_slice()) {
            Ok(true) => {
                self.transition(DaemonState::Running);
                Ok(())
            }
            Ok(false) => {
                self.transition(DaemonState::Failed);
                Err(SupervisorError::daemon_start("bridge start returned false"))
            }
            Err(e) => {
                self.transition(DaemonState::Failed);
                Err(SupervisorError::daemon_start(e.to_string()))
            }
        }
    }

    /// Starts the daemon with `args`. Returns `false` on any failure.
    pub fn start(&mut self, args: &DaemonArguments) -> bool {
        match self.try_start(args) {
            Ok(()) => {
                tracing::info!("daemon started");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, state = %self.state, "failed to start daemon");
                false
            }
        }
    }

    /// Starts the daemon with [`default_arguments`].
    pub fn start_default(&mut self) -> bool {
        self.start(&default_arguments())
    }

    /// Starts the daemon with arguments built from `listeners`.
    pub fn start_with_listeners(&mut self, listeners: &ListenerConfig) -> bool {
        self.start(&listeners.to_arguments())
    }

    /// Stops the daemon. Never fails; the state always ends as `Stopped`.
    pub fn stop(&mut self) {
        tracing::info!("stopping daemon");
        if let Err(e) = Guarded::new(&self.bridge).stop() {
            let err = SupervisorError::daemon_stop(e.to_string());
            tracing::error!(error = %err, "error stopping daemon");
        }
        self.transition(DaemonState::Stopped);
    }

    /// Asks the bridge whether the daemon is running. `false` on failure.
    pub fn is_running(&self) -> bool {
        match Guarded::new(&self.bridge).is_running() {
            Ok(running) => running,
            Err(e) => {
                let err = SupervisorError::query(e.to_string());
                tracing::error!(error = %err, "error checking daemon status");
                false
            }
        }
    }

    /// Asks the bridge for the daemon version. [`UNKNOWN_VERSION`] on failure.
    pub fn version(&self) -> String {
        match Guarded::new(&self.bridge).version() {
            Ok(version) => version,
            Err(e) => {
                let err = SupervisorError::query(e.to_string());
                tracing::error!(error = %err, "error getting daemon version");
                UNKNOWN_VERSION.to_string()
            }
        }
    }
}
