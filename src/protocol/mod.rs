// src/protocol/mod.rs
//
// Host side of the Tenzr line protocol.
//
// Commands are `$`-prefixed, `;`-terminated ASCII strings written to the
// device verbatim. Everything the device sends back is newline-delimited
// telemetry, handled by the serial framer.

pub mod command;
pub mod error;
pub mod grammar;

pub use command::{Attitude, Axis, Command, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};
pub use error::RejectionReason;
pub use grammar::validate;
