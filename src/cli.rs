use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use tenzr_lib::io::serial::FlowControl;
use tenzr_lib::AppSettings;

#[derive(Parser)]
#[command(
    name = "tenzr",
    version,
    about = "Host controller for Tenzr devices over a serial link",
    long_about = "Sends validated $<command>; lines to a Tenzr device and prints its telemetry.\n\
                  While streaming, telemetry is exported to a CSV file per session."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (defaults to <config_dir>/tenzr/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect and run the interactive command loop (default)
    Run,
    /// List available serial ports
    Ports(PortsArgs),
    /// Validate a command without opening a port
    Validate(ValidateArgs),
    /// Print the effective settings as TOML
    Config,
}

/// Per-invocation overrides of the settings file
#[derive(Args, Default)]
pub struct Overrides {
    /// Serial port name (e.g. /dev/ttyUSB0, COM9)
    #[arg(long, global = true)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(long, global = true)]
    pub baud: Option<u32>,

    /// Directory for streaming session exports
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    /// Flow control: none, software, hardware
    #[arg(long, global = true)]
    pub flow_control: Option<FlowControl>,

    /// Leave DTR deasserted after opening the port
    #[arg(long, global = true)]
    pub no_dtr: bool,

    /// Also write logs to this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(port) = &self.port {
            settings.port = port.clone();
        }
        if let Some(baud) = self.baud {
            settings.baud_rate = baud;
        }
        if let Some(dir) = &self.export_dir {
            settings.export_dir = dir.clone();
        }
        if let Some(flow) = self.flow_control {
            settings.flow_control = flow;
        }
        if self.no_dtr {
            settings.dtr = false;
        }
        if let Some(dir) = &self.log_dir {
            settings.log_dir = Some(dir.clone());
        }
    }
}

#[derive(Args)]
pub struct PortsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Command text, e.g. "$freq, 50;"
    #[arg(allow_hyphen_values = true)]
    pub text: String,
}
