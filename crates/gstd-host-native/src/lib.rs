// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # gstd-host-native
//!
//! The native half of `gstd-host`: a [`DylibOpener`] that `dlopen`s the
//! library tiers and a [`GstdBridge`] that drives `libgstd`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gstd_host_core::{DaemonPaths, Supervisor, SupervisorConfig};
//! use gstd_host_native::{DylibOpener, GstdBridge};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SupervisorConfig::default();
//! let opener = DylibOpener::from_library_dir(config.library_dir.as_deref());
//! let bridge = GstdBridge::from_config(&config)?;
//! let mut supervisor = Supervisor::new(config, opener, bridge);
//! supervisor.bootstrap(&DaemonPaths::new("/data/app/cache", "/data/app/files"))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod bridge;
pub mod env;
pub mod error;
pub mod opener;
pub mod symbols;

pub use bridge::{GSTD_LIBRARY, GstdBridge};
pub use env::GstEnvironment;
pub use error::{NativeError, Result};
pub use opener::{DylibOpener, resolve};
pub use symbols::{BUNDLED_VERSION, GstdSymbols};
