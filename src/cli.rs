//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for covidmap using clap's derive macros.

use clap::{Parser, Subcommand};

/// covidmap - COVID-19 per-country statistics service
#[derive(Parser)]
#[command(name = "covidmap")]
#[command(version)]
#[command(about = "COVID-19 CSV importer and per-country aggregation API", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Import the configured CSV files into the database and exit
    Import,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommand {
    /// Generate a sample configuration file from the defaults
    Generate {
        /// Output path (default: config.example.toml)
        path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
