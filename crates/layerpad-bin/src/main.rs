//! Layerpad entrypoint.
use anyhow::{Context, Result};
use clap::Parser;
use core_model::{JsonFileStore, Workbench, WorkbenchOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod commands;

use commands::Command;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "layerpad", version, about = "Layered annotation memos")]
struct Args {
    /// Optional configuration file path (overrides discovery of `layerpad.toml`).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,
    /// Directory holding the memo store (overrides `[store] dir`).
    #[arg(long = "store-dir", global = true)]
    store_dir: Option<PathBuf>,
    /// User scope key (overrides `[store] scope`).
    #[arg(long, global = true)]
    scope: Option<String>,
    #[command(subcommand)]
    command: Command,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let file_appender = tracing_appender::rolling::never(log_dir, "layerpad.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global subscriber already installed; dropping the guard shuts the writer down.
            }
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();

    let args = Args::parse();
    let config_override = args.config.is_some();
    let config = core_config::load_from(args.config)?;
    let dir = args
        .store_dir
        .or_else(|| config.store_dir())
        .unwrap_or_else(JsonFileStore::default_dir);
    let scope = args.scope.unwrap_or_else(|| config.store_scope().to_string());
    let store = JsonFileStore::new(&dir, &scope);
    info!(
        target: "runtime.startup",
        store = %store.path().display(),
        config_override,
        command = args.command.name(),
        "bootstrap_complete"
    );

    let options = WorkbenchOptions {
        registry: config.registry_options(),
        default_names: config.default_names(),
        history_limit: config.history_limit(),
    };
    let mut workbench = Workbench::new(store, options);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(&mut workbench, args.command, config.display_mode(), &mut out)?;
    workbench.close().context("saving the open memo")?;
    out.flush()?;
    Ok(())
}
