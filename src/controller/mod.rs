// src/controller/mod.rs
//
// Controller state machine.
//
//   Disconnected -> Connected <-> Streaming -> Closing -> Disconnected
//
// Streaming is Connected with an active export session. The operator flow
// (submit) and the receive flow (ReceivePump) share a single Link behind one
// mutex; Exit raises a stop flag and joins the receive flow before the
// transport is closed.

mod link;
mod receiver;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::error::FatalFault;
use crate::export::{SessionId, StreamSessionManager};
use crate::io::serial::DEFAULT_MAX_LINE_LENGTH;
use crate::io::Transport;
use crate::protocol::{validate, Command, RejectionReason};
use link::{lock, Link, Phase};

pub use receiver::ReceivePump;

// ============================================================================
// Types
// ============================================================================

/// Observable controller state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    Disconnected,
    Connected,
    Streaming,
    Closing,
}

/// What happens when the export sink cannot be written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFaultPolicy {
    /// Treat as fatal for the whole process
    #[default]
    Terminate,
    /// Stop the session and fall back to console output
    EndSession,
}

#[derive(Clone, Debug)]
pub struct ControllerOptions {
    /// Idle sleep of the receive flow when no bytes are available
    pub poll_interval: Duration,
    pub max_line_length: usize,
    pub export_fault_policy: ExportFaultPolicy,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            export_fault_policy: ExportFaultPolicy::Terminate,
        }
    }
}

/// Outcome of handing one line of operator input to the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Written to the device
    Sent(Command),
    /// Failed validation; nothing was sent
    Rejected(RejectionReason),
    /// `$exit;` accepted; the caller should shut down
    Exit,
    /// Input arrived after the link closed; dropped without a notice
    Ignored,
}

// ============================================================================
// Controller
// ============================================================================

pub struct Controller {
    link: Arc<Mutex<Link>>,
    console: Arc<dyn Console>,
    options: ControllerOptions,
    port_name: String,
    stop_flag: Arc<AtomicBool>,
    receiver: Option<JoinHandle<()>>,
    fault_tx: mpsc::UnboundedSender<FatalFault>,
    fault_rx: mpsc::UnboundedReceiver<FatalFault>,
}

impl Controller {
    /// Take ownership of an already opened transport. The controller starts
    /// Connected; call [`Controller::spawn_receiver`] to start the receive flow.
    pub fn new(
        transport: Box<dyn Transport>,
        sessions: StreamSessionManager,
        options: ControllerOptions,
        console: Arc<dyn Console>,
    ) -> Self {
        let port_name = transport.name().to_string();
        let (fault_tx, fault_rx) = mpsc::unbounded_channel();
        let link = Link {
            transport,
            sessions,
            phase: Phase::Connected,
            export_fault_policy: options.export_fault_policy,
        };

        Self {
            link: Arc::new(Mutex::new(link)),
            console,
            options,
            port_name,
            stop_flag: Arc::new(AtomicBool::new(false)),
            receiver: None,
            fault_tx,
            fault_rx,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn state(&self) -> ControllerState {
        match self.link.lock() {
            Ok(link) => link.state(),
            Err(_) => ControllerState::Disconnected,
        }
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.link
            .lock()
            .ok()
            .and_then(|link| link.sessions.current_session().cloned())
    }

    /// A receive pump sharing this controller's state. Used by
    /// spawn_receiver; tests drive it directly.
    pub fn receive_pump(&self) -> ReceivePump {
        ReceivePump::new(
            self.link.clone(),
            self.console.clone(),
            self.options.max_line_length,
            self.options.poll_interval,
        )
    }

    /// Start the receive flow on a blocking thread. Faults it hits are
    /// delivered through [`Controller::next_fault`].
    pub fn spawn_receiver(&mut self) {
        if self.receiver.is_some() {
            return;
        }
        let pump = self.receive_pump();
        let stop_flag = self.stop_flag.clone();
        let fault_tx = self.fault_tx.clone();

        self.receiver = Some(tokio::task::spawn_blocking(move || {
            if let Err(fault) = pump.run(&stop_flag) {
                let _ = fault_tx.send(fault);
            }
        }));
    }

    /// Wait for a fault from the receive flow
    pub async fn next_fault(&mut self) -> Option<FatalFault> {
        self.fault_rx.recv().await
    }

    #[cfg(test)]
    pub(crate) fn queue_fault(&self, fault: FatalFault) {
        let _ = self.fault_tx.send(fault);
    }

    /// Validate one line of operator input and act on it.
    ///
    /// Accepted commands other than `$exit;` are written to the device.
    /// `$stream;` starts a streaming session once the write succeeded; any
    /// other sent command ends the active one. `$exit;` moves to Closing and
    /// ends streaming; the caller finishes with [`Controller::shutdown`].
    pub fn submit(&mut self, text: &str) -> Result<Submission, FatalFault> {
        let mut link = lock(&self.link)?;

        if !link.accepts_traffic() {
            debug!("[controller] Ignoring input after disconnect: {:?}", text);
            return Ok(Submission::Ignored);
        }

        let command = match validate(text) {
            Ok(command) => command,
            Err(reason) => {
                drop(link);
                debug!("[controller] Rejected {:?}: {}", text, reason);
                self.console.notice(&format!("Command Invalid: {}", reason));
                return Ok(Submission::Rejected(reason));
            }
        };

        if command.is_exit() {
            link.phase = Phase::Closing;
            link.sessions.stop();
            info!("[controller] Exit requested");
            return Ok(Submission::Exit);
        }

        link.transport.write(&command.to_bytes())?;

        if command.is_stream_start() {
            link.sessions.start();
        } else {
            link.sessions.stop();
        }
        drop(link);

        info!("[controller] Sent {}", command);
        self.console.notice(&format!("Sent: {}", command));
        Ok(Submission::Sent(command))
    }

    /// Stop streaming, stop and join the receive flow, then close the
    /// transport. Safe to call more than once.
    pub async fn shutdown(&mut self) -> Result<(), FatalFault> {
        {
            let mut link = lock(&self.link)?;
            if link.phase == Phase::Disconnected {
                return Ok(());
            }
            link.phase = Phase::Closing;
            link.sessions.stop();
        }

        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.receiver.take() {
            if let Err(e) = handle.await {
                warn!("[controller] Receiver task panicked: {:?}", e);
            }
        }

        let mut link = lock(&self.link)?;
        let closed = link.transport.close();
        link.phase = Phase::Disconnected;
        info!("[controller] Disconnected from {}", self.port_name);
        closed.map_err(FatalFault::from)
    }
}

// ============================================================================
// Tests
// ============================================================================
