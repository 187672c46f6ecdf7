//! Import subcommand for task-board CLI
//!
//! Loads a JSON snapshot of the store tables into the local SQLite
//! database, for offline use and demos.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the import subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the snapshot file to import
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Remove existing rows before importing
    ///
    /// By default rows are upserted by id, leaving rows that are not in
    /// the snapshot untouched.
    #[arg(long)]
    pub replace: bool,
}

impl ImportArgs {
    /// Describe the import mode for logging
    pub fn import_mode(&self) -> &'static str {
        if self.replace { "replace" } else { "upsert" }
    }
}
