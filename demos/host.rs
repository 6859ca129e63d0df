//! Host shell for the embedded GStreamer Daemon.
//!
//! Plays the part of the application process: supplies storage directories,
//! bootstraps the supervisor, keeps the daemon up until Enter is pressed and
//! then shuts it down.
//!
//! # Usage
//!
//! ```bash
//! # Search the platform library path, store state under $TMPDIR/gstd-host
//! cargo run --example host
//!
//! # Load libraries from a directory and use a config file
//! cargo run --example host -- --config gstd-host.toml --lib-dir /opt/gstreamer/lib
//!
//! # Print the arguments the daemon would be started with
//! cargo run --example host -- --print-args
//! ```

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use gstd_host::prelude::*;

struct DemoHost {
    root: PathBuf,
}

impl HostContext for DemoHost {
    fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn main() -> ExitCode {
    gstd_host::logging::init("info");

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match flag_value(&args, "--config") {
        Some(path) => match SupervisorConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => SupervisorConfig::default(),
    };
    if let Some(dir) = flag_value(&args, "--lib-dir") {
        config.library_dir = Some(PathBuf::from(dir));
    }

    if args.iter().any(|a| a == "--print-args") {
        println!("{}", config.listeners.to_arguments());
        return ExitCode::SUCCESS;
    }

    let root = flag_value(&args, "--data-dir")
        .map_or_else(|| std::env::temp_dir().join("gstd-host"), PathBuf::from);
    let host = DemoHost { root };
    for dir in [host.cache_dir(), host.files_dir()] {
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("error: cannot create {}: {e}", dir.display());
            return ExitCode::FAILURE;
        }
    }

    let mut supervisor = match gstd_host::native_supervisor(config) {
        Ok(supervisor) => supervisor,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let boot = match supervisor.bootstrap(&host) {
        Ok(boot) => boot,
        Err(e) => {
            eprintln!("bootstrap failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("boot {}", boot.boot_id);
    println!("  libraries loaded: {}", boot.load.loaded_count());
    for skipped in boot.load.failures() {
        println!("  skipped: {}", skipped.identifier);
    }
    if !boot.daemon_started {
        println!("  daemon: not started");
        return ExitCode::FAILURE;
    }
    println!("  daemon: {}", supervisor.controller().version());
    if let Some(http) = &boot.http_endpoint {
        println!("  http:   {http}");
    }
    if let Some(tcp) = &boot.tcp_endpoint {
        println!("  tcp:    {tcp}");
    }

    println!("\nPress Enter to stop.");
    let _ = std::io::stdin().lock().lines().next();

    let state = supervisor.shutdown();
    println!("daemon {state}");
    ExitCode::SUCCESS
}

fn print_help() {
    println!(
        r#"gstd-host - embedded GStreamer Daemon host shell

USAGE:
    cargo run --example host [-- OPTIONS]

OPTIONS:
    --config <FILE>      Load supervisor configuration from a TOML file
    --lib-dir <DIR>      Load shared libraries from DIR
    --data-dir <DIR>     Root for the cache/ and files/ directories
    --print-args         Print the daemon arguments and exit
    --help, -h           Print this help message

ENVIRONMENT:
    RUST_LOG             Log filter (default: info)
"#
    );
}
