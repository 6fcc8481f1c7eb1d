// src/logging.rs
//
// tracing setup. Diagnostics go to stderr with an `HH:MM:SS.mmm` local
// timestamp, and optionally to a timestamped log file as well.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Name of the symlink pointing at the newest log file (Unix only)
const LATEST_LOG_NAME: &str = "tenzr.log";

/// Local wall-clock timer, same format on stderr and in files
#[derive(Clone, Copy, Debug, Default)]
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Filter directive for a `-v` count. `RUST_LOG` takes precedence.
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Returns the log file path when file
/// logging was enabled.
pub fn init(verbosity: u8, log_dir: Option<&Path>) -> Result<Option<PathBuf>, String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime)
        .with_target(false);

    let (file_layer, log_path) = match log_dir {
        Some(dir) => {
            let (file, path) = open_log_file(dir)?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_timer(LocalTime)
                .with_target(false);
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    if let Some(path) = &log_path {
        tracing::info!("[logging] File logging started: {}", path.display());
    }
    Ok(log_path)
}

/// Create `<dir>/<yyyyMMdd-HHmmss>-tenzr.log` and point the `tenzr.log`
/// symlink at it.
pub(crate) fn open_log_file(dir: &Path) -> Result<(File, PathBuf), String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("Failed to create log dir: {}", e))?;

    let filename = chrono::Local::now()
        .format("%Y%m%d-%H%M%S-tenzr.log")
        .to_string();
    let log_path = dir.join(&filename);

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| format!("Failed to create log file: {}", e))?;

    // Windows symlinks require elevated privileges
    #[cfg(unix)]
    {
        let symlink_path = dir.join(LATEST_LOG_NAME);
        let _ = std::fs::remove_file(&symlink_path);
        if let Err(e) = std::os::unix::fs::symlink(&filename, &symlink_path) {
            eprintln!("[logging] Failed to create {} symlink: {}", LATEST_LOG_NAME, e);
        }
    }

    Ok((file, log_path))
}
