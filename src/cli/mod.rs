//! CLI command definitions for task-board
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod import;
pub mod list;

use clap::{Parser, Subcommand, ValueEnum};
use import::ImportArgs;
use list::ListArgs;

use crate::config::StoreBackend;

/// Store backend selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliBackend {
    /// Hosted store over REST
    Rest,
    /// Local SQLite database
    Sqlite,
}

impl From<CliBackend> for StoreBackend {
    fn from(backend: CliBackend) -> Self {
        match backend {
            CliBackend::Rest => StoreBackend::Rest,
            CliBackend::Sqlite => StoreBackend::Sqlite,
        }
    }
}

/// Task board web dashboard and CLI tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Store backend (overrides config)
    #[arg(long, value_enum, global = true)]
    pub backend: Option<CliBackend>,

    /// Base URL of the hosted store (overrides config)
    #[arg(long, global = true)]
    pub store_url: Option<String>,

    /// API key for the hosted store (overrides config)
    #[arg(long, global = true)]
    pub store_key: Option<String>,

    /// Path to database file for the sqlite backend (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Port for the web dashboard (default: 31994)
    #[arg(long, global = true)]
    pub ui_port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web dashboard (default if no subcommand given)
    Serve,

    /// Print tasks matching the given filters
    List(ListArgs),

    /// Load a JSON snapshot into the local database
    Import(ImportArgs),
}
