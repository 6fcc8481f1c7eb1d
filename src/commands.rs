use std::sync::Arc;

use tenzr_lib::io::serial::list_serial_ports;
use tenzr_lib::{app, validate, AppSettings, StdoutConsole};

use crate::cli::{PortsArgs, ValidateArgs};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_REJECTED: i32 = 2;

pub async fn run(settings: &AppSettings) -> i32 {
    match app::run(settings, Arc::new(StdoutConsole)).await {
        Ok(()) => EXIT_OK,
        Err(fault) => {
            eprintln!("Error: {}", fault);
            fault.exit_code()
        }
    }
}

pub fn ports(args: PortsArgs) -> i32 {
    let ports = match list_serial_ports() {
        Ok(ports) => ports,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_FAILURE;
        }
    };

    if args.json {
        return match serde_json::to_string_pretty(&ports) {
            Ok(json) => {
                println!("{}", json);
                EXIT_OK
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_FAILURE
            }
        };
    }

    if ports.is_empty() {
        println!("No serial ports found.");
        return EXIT_OK;
    }
    for port in &ports {
        let mut line = format!("{:<24} {}", port.port_name, port.port_type);
        if let (Some(vid), Some(pid)) = (port.vid, port.pid) {
            line.push_str(&format!(" {:04x}:{:04x}", vid, pid));
        }
        if let Some(product) = &port.product {
            line.push_str(&format!(" {}", product));
        }
        println!("{}", line);
    }
    EXIT_OK
}

pub fn validate_command(args: ValidateArgs) -> i32 {
    match validate(&args.text) {
        Ok(command) => {
            println!("{}", command);
            EXIT_OK
        }
        Err(reason) => {
            println!("Command Invalid: {}", reason);
            EXIT_REJECTED
        }
    }
}

pub fn config(settings: &AppSettings) -> i32 {
    match settings.to_toml() {
        Ok(toml) => {
            print!("{}", toml);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}
