// src/error.rs
//
// Fatal fault taxonomy. Anything in here ends the process: the top-level
// handler closes the transport (best effort) and exits with status 1.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to open {port}: {reason}")]
    Open { port: String, reason: String },

    #[error("Serial write error on {port}: {source}")]
    Write {
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serial read error on {port}: {source}")]
    Read {
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transport state lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create export directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open export file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write export file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No streaming session is active")]
    NoActiveSession,

    #[error("Line addressed to session {requested} but session {active} is active")]
    SessionMismatch { requested: String, active: String },
}

/// Fault that terminates the controller
#[derive(Debug, Error)]
pub enum FatalFault {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl FatalFault {
    /// Process exit status for this fault
    pub fn exit_code(&self) -> i32 {
        1
    }
}
