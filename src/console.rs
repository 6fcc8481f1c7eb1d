// src/console.rs
//
// Operator-facing output. Telemetry and status lines go to stdout; tracing
// diagnostics go to stderr, so the two never interleave on one stream.

use std::io::Write;

/// Destination for operator-visible text
pub trait Console: Send + Sync {
    /// A telemetry line received from the device
    fn telemetry(&self, line: &str);

    /// A status or echo message (`Sent: ...`, `Command Invalid`, ...)
    fn notice(&self, message: &str);
}

/// Console writing to the process stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn telemetry(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{}", line).and_then(|_| handle.flush());
    }

    fn notice(&self, message: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{}", message).and_then(|_| handle.flush());
    }
}
