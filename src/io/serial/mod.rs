// src/io/serial/mod.rs
//
// Serial port driver with newline framing.
//
// Features:
// - Transport implementation over the serialport crate
// - Newline-delimited telemetry framing
// - Port enumeration

pub mod framer;
pub mod port;
pub(crate) mod utils;

pub use framer::{FramedLine, LineFramer, DEFAULT_MAX_LINE_LENGTH};
pub use port::{list_serial_ports, SerialConfig, SerialPortInfo, SerialTransport};
pub use utils::{FlowControl, Parity};
