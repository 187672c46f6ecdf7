//! Configuration.
//!
//! Merged from these tiers, lowest precedence first:
//! 1. **Defaults**
//! 2. **User** - `~/.task-board/config.yaml`
//! 3. **Project** - `./task-board.yaml`
//! 4. **Explicit** - `--config` or `TASK_BOARD_CONFIG_PATH`
//! 5. **Environment** - variables below
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `TASK_BOARD_STORE_URL` - Hosted store base URL
//! - `TASK_BOARD_STORE_KEY` - Hosted store API key
//! - `TASK_BOARD_STORE_BACKEND` - `rest` or `sqlite`
//! - `TASK_BOARD_DB_PATH` - SQLite database path
//! - `TASK_BOARD_PORT` - Dashboard port
//! - `TASK_BOARD_CONFIG_PATH` - Explicit config file

mod loader;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, PROJECT_CONFIG_FILE};
pub use types::*;
