use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Command};
use tenzr_lib::{logging, AppSettings};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut settings = match AppSettings::load_or_default(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(commands::EXIT_FAILURE);
        }
    };
    cli.overrides.apply(&mut settings);

    if let Err(e) = logging::init(cli.verbose, settings.log_dir.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(commands::EXIT_FAILURE);
    }

    let exit_code = match cli.command.unwrap_or(Command::Run) {
        Command::Run => commands::run(&settings).await,
        Command::Ports(args) => commands::ports(args),
        Command::Validate(args) => commands::validate_command(args),
        Command::Config => commands::config(&settings),
    };

    std::process::exit(exit_code);
}
