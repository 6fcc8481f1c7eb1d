// src/io/mod.rs
//
// Device link abstraction. The controller only ever talks to a `Transport`;
// the serial driver is one implementation, tests use an in-memory one.

use crate::error::TransportError;

pub mod serial;

#[cfg(test)]
pub(crate) mod mock;

/// Byte-level duplex channel to the device
pub trait Transport: Send {
    /// Port or device name used in messages
    fn name(&self) -> &str;

    fn is_open(&self) -> bool;

    /// Write all bytes and flush
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Read whatever is currently available into `buf`.
    /// Returns `Ok(0)` when nothing arrived within the read timeout.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Release the link. Closing an already closed transport is a no-op.
    fn close(&mut self) -> Result<(), TransportError>;
}
