// src/controller/receiver.rs
//
// Receive flow: poll the transport, frame bytes into lines, route each line.
// Runs on a blocking thread until the shared stop flag is raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error};

use super::link::{lock, Link};
use crate::console::Console;
use crate::error::FatalFault;
use crate::io::serial::LineFramer;

const READ_CHUNK: usize = 1024;

pub struct ReceivePump {
    link: Arc<Mutex<Link>>,
    console: Arc<dyn Console>,
    framer: LineFramer,
    buf: Vec<u8>,
    poll_interval: Duration,
}

impl ReceivePump {
    pub(crate) fn new(
        link: Arc<Mutex<Link>>,
        console: Arc<dyn Console>,
        max_line_length: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            link,
            console,
            framer: LineFramer::new(max_line_length),
            buf: vec![0u8; READ_CHUNK],
            poll_interval,
        }
    }

    /// One read/frame/route cycle. Returns the number of bytes read.
    ///
    /// The lock is held for the whole cycle, so routing always sees the
    /// session state as of this read.
    pub fn pump_once(&mut self) -> Result<usize, FatalFault> {
        let mut link = lock(&self.link)?;
        if !link.accepts_traffic() {
            return Ok(0);
        }

        let n = link.transport.read_available(&mut self.buf)?;
        if n == 0 {
            return Ok(0);
        }

        for line in self.framer.feed(&self.buf[..n]) {
            link.route(&line, self.console.as_ref())?;
        }
        Ok(n)
    }

    /// Pump until `stop` is raised or a fault occurs
    pub fn run(mut self, stop: &AtomicBool) -> Result<(), FatalFault> {
        debug!("[controller] Receiver started");

        while !stop.load(Ordering::SeqCst) {
            match self.pump_once() {
                Ok(0) => std::thread::sleep(self.poll_interval),
                Ok(_) => {}
                Err(fault) => {
                    error!("[controller] Receiver stopped: {}", fault);
                    return Err(fault);
                }
            }
        }

        if let Some(partial) = self.framer.flush() {
            debug!(
                "[controller] Discarding unterminated line at shutdown ({} chars)",
                partial.text.chars().count()
            );
        }
        debug!("[controller] Receiver stopped");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> &[u8] {
        self.framer.pending()
    }
}
