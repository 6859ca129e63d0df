//! Supervisor configuration types.
//!
//! Configuration is validated at load time, with defaults matching the fixed
//! library tiers and the loopback-only daemon listeners.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SupervisorError};
use crate::types::{DaemonArguments, LibraryEntry, LibraryTier};

/// Program name token passed as the daemon's `argv[0]`.
pub const DAEMON_PROGRAM: &str = "gstd";

/// Default HTTP control port.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default TCP control base port.
pub const DEFAULT_TCP_BASE_PORT: u16 = 5000;

/// Default bind address for both control listeners.
pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Libraries whose load failure is tolerated. Every other library is required.
pub const OPTIONAL_LIBRARIES: [&str; 3] = ["ffi", "intl", "iconv"];

/// Library tiers in dependency order, as `(label, identifiers)`.
const DEFAULT_TIER_LAYOUT: [(&str, &[&str]); 4] = [
    ("glib", &["glib-2.0", "gobject-2.0", "gio-2.0", "gmodule-2.0"]),
    ("support", &["ffi", "intl", "iconv", "json-glib-1.0"]),
    ("gstreamer", &["gstreamer-1.0", "gstbase-1.0"]),
    ("gstd", &["gstinterpipe", "gstd"]),
];

/// Returns true if `identifier` is on the optional-library allow-list.
#[must_use]
pub fn is_optional_library(identifier: &str) -> bool {
    OPTIONAL_LIBRARIES.contains(&identifier)
}

/// Builds tiers from identifier groups, classifying each entry against the
/// optional-library allow-list.
#[must_use]
pub fn classify_tiers(layout: &[(&str, &[&str])]) -> Vec<LibraryTier> {
    layout
        .iter()
        .map(|(label, identifiers)| {
            let entries = identifiers
                .iter()
                .map(|id| {
                    if is_optional_library(id) {
                        LibraryEntry::optional(*id)
                    } else {
                        LibraryEntry::required(*id)
                    }
                })
                .collect();
            LibraryTier::new(*label, entries)
        })
        .collect()
}

/// The fixed library tiers for GLib, GStreamer and gstd.
#[must_use]
pub fn default_tiers() -> Vec<LibraryTier> {
    classify_tiers(&DEFAULT_TIER_LAYOUT)
}

/// Supervisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Directory searched for shared objects. `None` uses the platform search path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_dir: Option<PathBuf>,

    /// What `start` does when the daemon is already running.
    #[serde(default)]
    pub start_guard: StartGuard,

    /// How long the native bridge waits before confirming the daemon survived startup.
    #[serde(default = "default_startup_grace")]
    #[serde(with = "humantime_serde")]
    pub startup_grace: Duration,

    /// Daemon control listeners.
    #[serde(default)]
    pub listeners: ListenerConfig,

    /// Library tiers, loaded in order.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<LibraryTier>,
}

fn default_startup_grace() -> Duration {
    Duration::from_millis(500)
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            library_dir: None,
            start_guard: StartGuard::default(),
            startup_grace: default_startup_grace(),
            listeners: ListenerConfig::default(),
            tiers: default_tiers(),
        }
    }
}

impl SupervisorConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.tiers.iter().all(|t| t.entries.is_empty()) {
            return Err(SupervisorError::config("at least one library must be listed"));
        }
        for entry in self.tiers.iter().flat_map(|t| &t.entries) {
            if entry.identifier.trim().is_empty() {
                return Err(SupervisorError::config("library identifier cannot be empty"));
            }
            if entry.required == is_optional_library(&entry.identifier) {
                return Err(SupervisorError::config(format!(
                    "library '{}' must be {}: only {} may be optional",
                    entry.identifier,
                    if entry.required { "optional" } else { "required" },
                    OPTIONAL_LIBRARIES.join(", ")
                )));
            }
        }
        self.listeners.validate()
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SupervisorError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

/// Daemon control-plane listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Enable the HTTP protocol.
    #[serde(default = "default_true")]
    pub http_enabled: bool,

    /// HTTP bind address.
    #[serde(default = "default_address")]
    pub http_address: IpAddr,

    /// HTTP port.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Enable the TCP protocol.
    #[serde(default = "default_true")]
    pub tcp_enabled: bool,

    /// TCP bind address.
    #[serde(default = "default_address")]
    pub tcp_address: IpAddr,

    /// First TCP port.
    #[serde(default = "default_tcp_base_port")]
    pub tcp_base_port: u16,

    /// Pass `-q` to the daemon.
    #[serde(default = "default_true")]
    pub quiet: bool,

    /// Permit non-loopback bind addresses.
    #[serde(default)]
    pub allow_remote_control: bool,
}

fn default_true() -> bool {
    true
}

fn default_address() -> IpAddr {
    LOOPBACK
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_tcp_base_port() -> u16 {
    DEFAULT_TCP_BASE_PORT
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            http_enabled: true,
            http_address: LOOPBACK,
            http_port: DEFAULT_HTTP_PORT,
            tcp_enabled: true,
            tcp_address: LOOPBACK,
            tcp_base_port: DEFAULT_TCP_BASE_PORT,
            quiet: true,
            allow_remote_control: false,
        }
    }
}

impl ListenerConfig {
    /// Validates ports and the loopback boundary.
    pub fn validate(&self) -> Result<()> {
        if self.http_enabled && self.http_port == 0 {
            return Err(SupervisorError::config("http_port must be greater than 0"));
        }
        if self.tcp_enabled && self.tcp_base_port == 0 {
            return Err(SupervisorError::config("tcp_base_port must be greater than 0"));
        }
        if !self.allow_remote_control {
            for (name, enabled, addr) in [
                ("http_address", self.http_enabled, self.http_address),
                ("tcp_address", self.tcp_enabled, self.tcp_address),
            ] {
                if enabled && !addr.is_loopback() {
                    return Err(SupervisorError::config(format!(
                        "{name} {addr} is not a loopback address (set allow_remote_control to permit it)"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Builds the daemon argument tokens for these listeners.
    #[must_use]
    pub fn to_arguments(&self) -> DaemonArguments {
        let mut tokens = vec![DAEMON_PROGRAM.to_string()];
        if self.http_enabled {
            tokens.push("--enable-http-protocol".to_string());
            tokens.push(format!("--http-address={}", self.http_address));
            tokens.push(format!("--http-port={}", self.http_port));
        }
        if self.tcp_enabled {
            tokens.push("--enable-tcp-protocol".to_string());
            tokens.push(format!("--tcp-address={}", self.tcp_address));
            tokens.push(format!("--tcp-base-port={}", self.tcp_base_port));
        }
        if self.quiet {
            tokens.push("-q".to_string());
        }
        DaemonArguments::from(tokens)
    }

    /// HTTP API endpoint URL, if enabled.
    #[must_use]
    pub fn http_endpoint(&self) -> Option<String> {
        self.http_enabled
            .then(|| format!("http://{}", socket_display(self.http_address, self.http_port)))
    }

    /// TCP client endpoint, if enabled.
    #[must_use]
    pub fn tcp_endpoint(&self) -> Option<String> {
        self.tcp_enabled
            .then(|| socket_display(self.tcp_address, self.tcp_base_port))
    }
}

fn socket_display(addr: IpAddr, port: u16) -> String {
    std::net::SocketAddr::new(addr, port).to_string()
}

/// Policy for `start` while the daemon is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StartGuard {
    /// Call the bridge start again and let the bridge decide.
    #[default]
    Reinvoke,
    /// Refuse without calling the bridge.
    Reject,
    /// Stop the daemon, then start it again.
    Restart,
}

/// Serde helper for humantime durations.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
