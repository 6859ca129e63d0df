//! Bootstrap against the real dynamic linker with libraries absent.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use gstd_host_core::{
    BridgeResult, ControlBridge, DaemonPaths, DaemonState, LibraryEntry, LibraryTier, Supervisor,
    SupervisorConfig, SupervisorError,
};
use gstd_host_native::{DylibOpener, GstdBridge};

/// Counts calls; every call succeeds.
#[derive(Default)]
struct CountingBridge {
    init: AtomicU32,
    start: AtomicU32,
}

impl ControlBridge for CountingBridge {
    fn init(&self, _: &Path, _: &Path) -> BridgeResult<bool> {
        self.init.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn start(&self, _: &[String]) -> BridgeResult<bool> {
        self.start.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn stop(&self) -> BridgeResult<()> {
        Ok(())
    }

    fn is_running(&self) -> BridgeResult<bool> {
        Ok(false)
    }

    fn version(&self) -> BridgeResult<String> {
        Ok("test".to_string())
    }
}

fn host(root: &Path) -> DaemonPaths {
    DaemonPaths::new(root.join("cache"), root.join("files"))
}

#[test]
fn empty_library_dir_fails_on_first_required_library() {
    let dir = tempfile::tempdir().unwrap();
    let config = SupervisorConfig {
        library_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let opener = DylibOpener::from_library_dir(config.library_dir.as_deref());
    let mut supervisor = Supervisor::new(config, opener, CountingBridge::default());

    let err = supervisor.bootstrap(&host(dir.path())).unwrap_err();

    match err {
        SupervisorError::RequiredLibraryLoad { identifier, reason } => {
            assert_eq!(identifier, "glib-2.0");
            assert!(reason.contains("not found"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(supervisor.state(), DaemonState::Unloaded);
    assert_eq!(supervisor.controller().bridge().init.load(Ordering::SeqCst), 0);
    assert_eq!(supervisor.loader().opener().loaded().count(), 0);
}

#[test]
fn missing_optional_libraries_do_not_block_start() {
    let dir = tempfile::tempdir().unwrap();
    let config = SupervisorConfig {
        library_dir: Some(dir.path().to_path_buf()),
        tiers: vec![LibraryTier::new(
            "support",
            vec![LibraryEntry::optional("ffi"), LibraryEntry::optional("iconv")],
        )],
        ..Default::default()
    };
    let opener = DylibOpener::from_library_dir(config.library_dir.as_deref());
    let mut supervisor = Supervisor::new(config, opener, CountingBridge::default());

    let boot = supervisor.bootstrap(&host(dir.path())).unwrap();

    assert!(boot.load.overall_success);
    assert_eq!(boot.load.failures().count(), 2);
    assert!(boot.daemon_started);
    assert_eq!(supervisor.controller().bridge().start.load(Ordering::SeqCst), 1);
}

#[test]
fn gstd_bridge_supervisor_reports_missing_libraries() {
    let dir = tempfile::tempdir().unwrap();
    let config = SupervisorConfig {
        library_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let opener = DylibOpener::from_library_dir(config.library_dir.as_deref());
    let bridge = GstdBridge::from_config(&config).unwrap();
    let mut supervisor = Supervisor::new(config, opener, bridge);

    let err = supervisor.bootstrap(&host(dir.path())).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(supervisor.shutdown(), DaemonState::Unloaded);
}

#[test]
fn config_file_drives_listener_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("gstd-host.toml");
    std::fs::write(
        &path,
        r#"
startup_grace = "250ms"

[listeners]
http_port = 9000
tcp_enabled = false
"#,
    )
    .unwrap();

    let config = SupervisorConfig::load(&path).unwrap();
    let args = config.listeners.to_arguments();

    assert_eq!(config.startup_grace, std::time::Duration::from_millis(250));
    assert!(args.as_slice().contains(&"--http-port=9000".to_string()));
    assert!(!args.as_slice().iter().any(|a| a.starts_with("--tcp")));
}
