// src/controller/link.rs
//
// State shared by the operator flow and the receive flow: the transport, the
// streaming session, and the connection phase. Always accessed under one
// mutex, so a command that ends streaming and a line arriving at the same
// time cannot interleave.

use std::sync::{Mutex, MutexGuard};
use tracing::{trace, warn};

use super::{ControllerState, ExportFaultPolicy};
use crate::console::Console;
use crate::error::{FatalFault, TransportError};
use crate::export::StreamSessionManager;
use crate::io::serial::FramedLine;
use crate::io::Transport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Connected,
    Closing,
    Disconnected,
}

pub(crate) struct Link {
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) sessions: StreamSessionManager,
    pub(crate) phase: Phase,
    pub(crate) export_fault_policy: ExportFaultPolicy,
}

impl Link {
    pub(crate) fn state(&self) -> ControllerState {
        match self.phase {
            Phase::Connected if self.sessions.is_active() => ControllerState::Streaming,
            Phase::Connected => ControllerState::Connected,
            Phase::Closing => ControllerState::Closing,
            Phase::Disconnected => ControllerState::Disconnected,
        }
    }

    pub(crate) fn accepts_traffic(&self) -> bool {
        self.phase == Phase::Connected && self.transport.is_open()
    }

    /// Send one received line to exactly one destination: the export sink
    /// while streaming, the console otherwise. Blank lines always go to the
    /// console.
    pub(crate) fn route(&mut self, line: &FramedLine, console: &dyn Console) -> Result<(), FatalFault> {
        let session = match self.sessions.current_session() {
            Some(id) if !line.is_blank() => id.clone(),
            _ => {
                console.telemetry(&line.text);
                return Ok(());
            }
        };

        match self.sessions.append(&session, &line.text) {
            Ok(()) => {
                trace!("[controller] Exported line to {}", session);
                Ok(())
            }
            Err(e) => match self.export_fault_policy {
                ExportFaultPolicy::Terminate => Err(e.into()),
                ExportFaultPolicy::EndSession => {
                    warn!("[export] {} - ending streaming session {}", e, session);
                    self.sessions.stop();
                    console.notice(&format!("Export failed, streaming session {} ended: {}", session, e));
                    console.telemetry(&line.text);
                    Ok(())
                }
            },
        }
    }
}

pub(crate) fn lock(link: &Mutex<Link>) -> Result<MutexGuard<'_, Link>, FatalFault> {
    link.lock().map_err(|_| FatalFault::Transport(TransportError::Poisoned))
}
