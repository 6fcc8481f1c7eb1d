// src/export.rs
//
// Streaming session bookkeeping and the per-session export sink.
//
// One session at a time. Its identity is the local start time formatted as
// `yyyy-MM-dd_HH-mm-ss`, which is also the base name of the export file:
// `<export_dir>/<identity>.csv`. Lines are appended verbatim, one per row,
// no header and no quoting.

use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ExportError;

/// chrono format for session identities (sortable, filesystem-safe)
pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Export file extension
pub const EXPORT_EXTENSION: &str = "csv";

// ============================================================================
// Types
// ============================================================================

/// Identity of a streaming session
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn from_time(started_at: &DateTime<Local>) -> Self {
        SessionId(started_at.format(SESSION_TIMESTAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One active export episode
#[derive(Debug)]
struct StreamSession {
    id: SessionId,
    started_at: DateTime<Local>,
    path: PathBuf,
    /// Opened on first append
    sink: Option<File>,
    lines_written: u64,
}

// ============================================================================
// Session Manager
// ============================================================================

/// Owns the streaming on/off state and the export sink
#[derive(Debug)]
pub struct StreamSessionManager {
    export_dir: PathBuf,
    active: Option<StreamSession>,
}

impl StreamSessionManager {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            active: None,
        }
    }

    /// Path of the export file for a session identity
    pub fn sink_path(&self, id: &SessionId) -> PathBuf {
        self.export_dir
            .join(format!("{}.{}", id.as_str(), EXPORT_EXTENSION))
    }

    /// Start a session stamped with the current local time
    pub fn start(&mut self) -> SessionId {
        self.start_at(Local::now())
    }

    /// Start a session stamped with `now`. Any session still active is
    /// stopped first. Nothing touches the disk until the first append.
    pub fn start_at(&mut self, now: DateTime<Local>) -> SessionId {
        self.stop();

        let id = SessionId::from_time(&now);
        let path = self.sink_path(&id);
        info!("[export] Streaming session {} started -> {}", id, path.display());

        self.active = Some(StreamSession {
            id: id.clone(),
            started_at: now,
            path,
            sink: None,
            lines_written: 0,
        });
        id
    }

    /// End the active session, closing its sink. The file is kept.
    pub fn stop(&mut self) -> Option<SessionId> {
        let session = self.active.take()?;
        let elapsed = Local::now().signed_duration_since(session.started_at);
        info!(
            "[export] Streaming session {} stopped after {}s ({} line(s) written to {})",
            session.id,
            elapsed.num_seconds(),
            session.lines_written,
            session.path.display()
        );
        // Dropping the File closes it; every append already flushed
        Some(session.id)
    }

    pub fn current_session(&self) -> Option<&SessionId> {
        self.active.as_ref().map(|s| &s.id)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Lines written by the active session, 0 when idle
    pub fn lines_written(&self) -> u64 {
        self.active.as_ref().map_or(0, |s| s.lines_written)
    }

    /// Append one line to the active session's sink.
    ///
    /// Appending without an active session, or to a session that is no longer
    /// the active one, is an error rather than a silent drop.
    pub fn append(&mut self, id: &SessionId, line: &str) -> Result<(), ExportError> {
        let export_dir = self.export_dir.clone();
        let session = self.active.as_mut().ok_or(ExportError::NoActiveSession)?;
        if &session.id != id {
            return Err(ExportError::SessionMismatch {
                requested: id.to_string(),
                active: session.id.to_string(),
            });
        }

        if session.sink.is_none() {
            session.sink = Some(open_sink(&export_dir, &session.path)?);
        }

        let path = &session.path;
        if let Some(sink) = session.sink.as_mut() {
            writeln!(sink, "{}", line)
                .and_then(|_| sink.flush())
                .map_err(|source| ExportError::Write {
                    path: path.clone(),
                    source,
                })?;
        }
        session.lines_written += 1;
        Ok(())
    }
}

/// Create the export directory if needed and open the sink for appending
fn open_sink(export_dir: &Path, path: &Path) -> Result<File, ExportError> {
    std::fs::create_dir_all(export_dir).map_err(|source| ExportError::CreateDir {
        path: export_dir.to_path_buf(),
        source,
    })?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ExportError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("[export] Opened sink {}", path.display());
    Ok(file)
}

// ============================================================================
// Tests
// ============================================================================
