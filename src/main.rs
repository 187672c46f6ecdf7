//! Task Board
//!
//! Serves the task dashboard, or runs one of the CLI tools.

use anyhow::{Result, bail};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use task_board::cli::{Cli, Command};
use task_board::cli::import::ImportArgs;
use task_board::cli::list::ListArgs;
use task_board::config::{Config, ConfigLoader};
use task_board::dashboard;
use task_board::db::Database;
use task_board::db::import::Snapshot;
use task_board::format::{OutputFormat, format_tasks};
use task_board::page::{PageState, TaskPage};
use task_board::store::{self, TaskStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    task_board::logging::init(&cli.log, cli.verbose)?;

    let loader = ConfigLoader::load(cli.config.as_ref().map(PathBuf::from))?;
    for path in loader.sources() {
        info!("Config: {}", path.display());
    }
    let mut config = loader.into_config();

    // Override config from CLI arguments
    if let Some(backend) = cli.backend {
        config.store.backend = backend.into();
    }
    if let Some(url) = &cli.store_url {
        config.store.url = Some(url.clone());
    }
    if let Some(key) = &cli.store_key {
        config.store.key = Some(key.clone());
    }
    if let Some(db_path) = &cli.database {
        config.store.db_path = db_path.into();
    }
    if let Some(port) = cli.ui_port {
        config.ui.port = port;
    }

    match cli.command {
        None | Some(Command::Serve) => run_server(config).await,
        Some(Command::List(args)) => run_list(config, args).await,
        Some(Command::Import(args)) => run_import(config, args),
    }
}

/// Run the dashboard until Ctrl-C.
async fn run_server(config: Config) -> Result<()> {
    info!("Starting Task Board v{}", env!("CARGO_PKG_VERSION"));
    info!("Store backend: {:?}", config.store.backend);

    let store: Arc<dyn TaskStore> = store::open(&config.store)?;

    let (shutdown_tx, addr) =
        dashboard::start_server(store, &config.ui.bind, config.ui.port).await?;
    info!("Dashboard available at http://{}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    let _ = shutdown_tx.send(());

    Ok(())
}

/// Run one retrieval through the page orchestrator and print the result.
async fn run_list(config: Config, args: ListArgs) -> Result<()> {
    let Some(format) = OutputFormat::from_str(&args.format) else {
        bail!("Unknown format '{}'. Valid options: markdown, json", args.format);
    };

    let store = store::open(&config.store)?;
    let filters = args.filters();
    let page = TaskPage::with_filters(store, filters.clone());

    match page.mount().await {
        PageState::Ready(tasks) => {
            println!("{}", format_tasks(&tasks, &filters, format, Utc::now())?);
            Ok(())
        }
        PageState::Error(message) => bail!("Failed to load tasks: {}", message),
        PageState::Loading => bail!("Task retrieval did not complete"),
    }
}

/// Load a snapshot into the local database.
fn run_import(config: Config, args: ImportArgs) -> Result<()> {
    config.store.ensure_db_dir()?;
    let snapshot = Snapshot::load(&args.file)?;

    info!(
        file = %args.file.display(),
        database = %config.store.db_path.display(),
        mode = args.import_mode(),
        "Importing snapshot"
    );

    let db = Database::open(&config.store.db_path)?;
    let summary = db.import_snapshot(&snapshot, args.replace)?;

    println!(
        "Imported {} users, {} tasks, {} comments, {} attachments into {}",
        summary.users,
        summary.tasks,
        summary.comments,
        summary.attachments,
        config.store.db_path.display()
    );
    Ok(())
}
