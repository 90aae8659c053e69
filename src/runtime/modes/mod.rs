//! Mode routing
//!
//! Entry points for the different execution modes:
//! - Server mode (HTTP server, default)
//! - Import mode (one-shot CSV ingestion)
//! - Config generation

pub mod config_gen;
pub mod import;
pub mod server;

pub use config_gen::run_config_generate;
pub use import::run_import;
pub use server::run_server;

use crate::cli::Commands;

/// Execution mode
#[derive(Debug, PartialEq)]
pub enum Mode {
    Server,
    Import,
    ConfigGenerate { path: Option<String>, force: bool },
}

/// Map the parsed subcommand to a mode; no subcommand runs the server
pub fn detect_mode(command: Option<Commands>) -> Mode {
    match command {
        None | Some(Commands::Serve) => Mode::Server,
        Some(Commands::Import) => Mode::Import,
        Some(Commands::Config {
            action: crate::cli::ConfigCommand::Generate { path, force },
        }) => Mode::ConfigGenerate { path, force },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mode() {
        assert_eq!(detect_mode(None), Mode::Server);
        assert_eq!(detect_mode(Some(Commands::Import)), Mode::Import);
    }
}
