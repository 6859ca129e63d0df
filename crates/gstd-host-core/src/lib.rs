// Allow unwrap/expect/panic in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # gstd-host-core
//!
//! Native library bootstrap and daemon lifecycle supervision for an embedded
//! GStreamer Daemon (`gstd`) running inside a host process.
//!
//! - [`LibraryLoader`] loads libraries in ordered tiers with required/optional policy
//! - [`DaemonEnvironment`] captures host storage paths and initializes the daemon once
//! - [`DaemonController`] owns the [`DaemonState`] machine: start, stop, status, version
//! - [`ControlBridge`] is the opaque native surface the above call into
//! - [`Supervisor`] wires them together for the host
//!
//! No native failure reaches the host: every bridge call is guarded and
//! degrades to a sentinel (`false`, `"unknown"`, or a swallowed stop).
//!
//! ## Example
//!
//! ```rust,ignore
//! use gstd_host_core::{DaemonPaths, Supervisor, SupervisorConfig};
//!
//! let mut supervisor = Supervisor::new(SupervisorConfig::default(), opener, bridge);
//! let boot = supervisor.bootstrap(&DaemonPaths::new("/data/cache", "/data/files"))?;
//! assert!(boot.daemon_started);
//! supervisor.shutdown();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod config;
pub mod controller;
pub mod environment;
pub mod error;
pub mod loader;
pub mod supervisor;
#[cfg(test)]
mod tests;
pub mod types;

pub use bridge::{BridgeError, BridgeOp, BridgeResult, ControlBridge, Guarded};
pub use config::{
    ListenerConfig, OPTIONAL_LIBRARIES, StartGuard, SupervisorConfig, default_tiers,
    is_optional_library,
};
pub use controller::{DaemonController, UNKNOWN_VERSION, default_arguments};
pub use environment::{DaemonEnvironment, HostContext};
pub use error::{Result, SupervisorError};
pub use loader::{LibraryLoader, LibraryOpener, LoadError};
pub use supervisor::{BootReport, Supervisor};
pub use types::{
    BootId, DaemonArguments, DaemonPaths, DaemonState, LibraryEntry, LibraryTier, LoadOutcome,
    LoadReport,
};
