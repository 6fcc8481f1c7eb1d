// src/io/mock.rs
//
// In-memory Transport for unit tests. Cloning shares the same state, so a
// test keeps one handle while the controller owns another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::Transport;
use crate::error::TransportError;

#[derive(Default)]
struct MockState {
    written: Vec<Vec<u8>>,
    inbound: VecDeque<Vec<u8>>,
    fail_writes: bool,
    fail_reads: bool,
    closed: bool,
    close_calls: usize,
}

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the next read_available() call
    pub fn push_inbound(&self, bytes: &[u8]) {
        self.state.lock().unwrap().inbound.push_back(bytes.to_vec());
    }

    pub fn written(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .written
            .iter()
            .map(|w| String::from_utf8_lossy(w).to_string())
            .collect()
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    pub fn fail_reads(&self) {
        self.state.lock().unwrap().fail_reads = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_open(&self) -> bool {
        !self.state.lock().unwrap().closed
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.closed || state.fail_writes {
            return Err(TransportError::Write {
                port: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "mock write failure"),
            });
        }
        state.written.push(bytes.to_vec());
        Ok(())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(TransportError::Read {
                port: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "mock read failure"),
            });
        }
        let Some(mut chunk) = state.inbound.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            state.inbound.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        state.close_calls += 1;
        Ok(())
    }
}
