// src/lib.rs
//
// Tenzr host controller: validates operator commands, sends them over a
// serial link, and routes the device's telemetry lines to the console or to
// a per-session export file.

pub mod app;
pub mod console;
pub mod controller;
pub mod error;
pub mod export;
pub mod io;
pub mod logging;
pub mod protocol;
pub mod settings;

pub use console::{Console, StdoutConsole};
pub use controller::{Controller, ControllerOptions, ControllerState, ExportFaultPolicy, Submission};
pub use error::{ExportError, FatalFault, TransportError};
pub use export::{SessionId, StreamSessionManager};
pub use io::Transport;
pub use protocol::{validate, Command, RejectionReason};
pub use settings::AppSettings;
