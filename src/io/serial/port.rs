// src/io/serial/port.rs
//
// serialport-backed Transport for the device link, plus port enumeration.

use serde::Serialize;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info};

use super::utils::{
    line_settings_label, to_serialport_data_bits, to_serialport_flow_control,
    to_serialport_parity, to_serialport_stop_bits, FlowControl, Parity,
};
use crate::error::TransportError;
use crate::io::Transport;

// ============================================================================
// Types and Configuration
// ============================================================================

/// Serial port configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
    pub flow_control: FlowControl,
    /// Assert DTR after opening (some boards only talk with DTR high)
    pub dtr: bool,
    /// Read timeout; a timed-out read yields zero bytes, not an error
    pub read_timeout: Duration,
}

/// Information about an available serial port
#[derive(Clone, Debug, Serialize)]
pub struct SerialPortInfo {
    pub port_name: String,
    pub port_type: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

// ============================================================================
// Serial Transport
// ============================================================================

pub struct SerialTransport {
    name: String,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialTransport {
    /// Open the port with the configured line settings
    pub fn open(config: &SerialConfig) -> Result<Self, TransportError> {
        let open_err = |e: serialport::Error| TransportError::Open {
            port: config.port.clone(),
            reason: e.to_string(),
        };

        let mut port = serialport::new(&config.port, config.baud_rate)
            .data_bits(to_serialport_data_bits(config.data_bits))
            .stop_bits(to_serialport_stop_bits(config.stop_bits))
            .parity(to_serialport_parity(config.parity))
            .flow_control(to_serialport_flow_control(config.flow_control))
            .timeout(config.read_timeout)
            .open()
            .map_err(open_err)?;

        if config.dtr {
            port.write_data_terminal_ready(true).map_err(open_err)?;
        }

        info!(
            "[serial] Opened {} at {} baud ({}) [flow: {:?}, dtr: {}]",
            config.port,
            config.baud_rate,
            line_settings_label(config.data_bits, config.parity, config.stop_bits),
            config.flow_control,
            config.dtr
        );

        Ok(Self {
            name: config.port.clone(),
            port: Some(port),
        })
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>, std::io::Error> {
        self.port.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "port is closed")
        })
    }
}

impl Transport for SerialTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let port = self.port_mut().and_then(|p| {
            p.write_all(bytes)?;
            p.flush()
        });
        port.map_err(|source| TransportError::Write {
            port: self.name.clone(),
            source,
        })
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let result = self.port_mut().and_then(|p| p.read(buf));
        match result {
            Ok(0) => Err(TransportError::Read {
                port: self.name.clone(),
                source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "device disconnected"),
            }),
            Ok(n) => Ok(n),
            Err(ref e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut
                        | std::io::ErrorKind::WouldBlock
                        | std::io::ErrorKind::Interrupted
                ) =>
            {
                // Timeout is expected for serial reads
                Ok(0)
            }
            Err(source) => Err(TransportError::Read {
                port: self.name.clone(),
                source,
            }),
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        // serialport releases the handle on drop
        if self.port.take().is_some() {
            debug!("[serial] Closed {}", self.name);
        }
        Ok(())
    }
}

// ============================================================================
// Port Enumeration
// ============================================================================

/// Ports the operator can actually open. macOS lists each device twice;
/// the /dev/tty.* twin blocks on open waiting for carrier detect.
fn is_listed(name: &str) -> bool {
    !(cfg!(target_os = "macos") && name.starts_with("/dev/tty."))
}

impl From<serialport::SerialPortInfo> for SerialPortInfo {
    fn from(info: serialport::SerialPortInfo) -> Self {
        let mut port = SerialPortInfo {
            port_name: info.port_name,
            port_type: String::new(),
            manufacturer: None,
            product: None,
            serial_number: None,
            vid: None,
            pid: None,
        };
        port.port_type = match info.port_type {
            serialport::SerialPortType::UsbPort(usb) => {
                port.manufacturer = usb.manufacturer;
                port.product = usb.product;
                port.serial_number = usb.serial_number;
                port.vid = Some(usb.vid);
                port.pid = Some(usb.pid);
                "USB"
            }
            serialport::SerialPortType::BluetoothPort => "Bluetooth",
            serialport::SerialPortType::PciPort => "PCI",
            serialport::SerialPortType::Unknown => "Unknown",
        }
        .to_string();
        port
    }
}

/// Enumerate serial ports the device may be attached to
pub fn list_serial_ports() -> Result<Vec<SerialPortInfo>, String> {
    let ports = serialport::available_ports().map_err(|e| format!("Failed to enumerate ports: {}", e))?;
    let listed: Vec<SerialPortInfo> = ports
        .into_iter()
        .filter(|p| is_listed(&p.port_name))
        .map(SerialPortInfo::from)
        .collect();
    debug!("[serial] Found {} port(s)", listed.len());
    Ok(listed)
}
