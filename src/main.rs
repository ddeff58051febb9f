use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use soloist::coordination::{LeaseManager, LeaseMonitor};
use soloist::generator::{ContentGenerator, ContentTemplate};
use soloist::ops;
use soloist::providers::{AlwaysReady, Clock, LogAction, LogNotifier, SystemClock};
use soloist::scheduler::{SchedulerCore, SchedulerRunner};
use soloist::storage::{FileStore, InMemoryStore, StateStore, StoreHandle};
use soloist::types::AgentIdentity;
use soloist::Config;

#[derive(Parser)]
#[command(name = "soloist")]
#[command(about = "Single-driver coordination agent over a shared store", long_about = None)]
#[command(version)]
struct Cli {
    /// Path of the shared store file. Omitting it runs against a private
    /// in-memory store (single-agent mode).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an agent: compete for roles and drive the schedule when owned
    Run,
    /// Enable the periodic schedule
    Start,
    /// Disable the periodic schedule
    Stop,
    /// Print leases, schedule and history state
    Status,
    /// Reset all coordination state to defaults
    Reset,
    /// Clear the content deduplication history
    ClearHistory,
    /// Toggle persisted diagnostics
    Diagnostics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    let store = open_store(cli.store);

    match cli.command {
        Commands::Run => run_agent(config, store).await?,
        Commands::Start => {
            let state = ops::enable_schedule(
                &store,
                &config,
                SystemClock.now(),
                &mut rand::thread_rng(),
            );
            println!(
                "schedule enabled, first action at {} (0/{} actions)",
                state.next_deadline, state.max_actions
            );
        }
        Commands::Stop => {
            let state = ops::disable_schedule(&store, &config);
            println!("schedule disabled at {}/{} actions", state.action_count, state.max_actions);
        }
        Commands::Status => print_status(&store, &config),
        Commands::Reset => {
            ops::reset_coordination(&store, &config);
            println!("coordination state reset");
        }
        Commands::ClearHistory => {
            ops::clear_history(&store);
            println!("content history cleared");
        }
        Commands::Diagnostics => {
            let enabled = ops::toggle_diagnostics(&store);
            println!(
                "diagnostics {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
    }

    Ok(())
}

fn open_store(path: Option<PathBuf>) -> StoreHandle {
    let backend: Arc<dyn StateStore> = match path {
        Some(path) => Arc::new(FileStore::new(path)),
        None => Arc::new(InMemoryStore::new()),
    };
    StoreHandle::new(backend)
}

fn print_status(store: &StoreHandle, config: &Config) {
    let snapshot = ops::status(store, config);
    println!(
        "schedule: {} ({}/{} actions)",
        if snapshot.schedule.enabled { "enabled" } else { "stopped" },
        snapshot.schedule.action_count,
        snapshot.schedule.max_actions,
    );
    if snapshot.schedule.enabled {
        println!("next deadline: {}", snapshot.schedule.next_deadline);
    }
    println!("history entries: {}", snapshot.history_len);
    println!(
        "diagnostics: {}",
        if snapshot.diagnostics { "on" } else { "off" }
    );
    if snapshot.diagnostics {
        println!("driver lease: {:?}", snapshot.driver);
        println!("surface lease: {:?}", snapshot.surface);
    } else {
        println!(
            "driver: {}",
            snapshot
                .driver
                .owner
                .map(|o| o.to_string())
                .unwrap_or_else(|| "unclaimed".to_string())
        );
        println!(
            "surface: {}",
            snapshot
                .surface
                .owner
                .map(|o| o.to_string())
                .unwrap_or_else(|| "unclaimed".to_string())
        );
    }
}

async fn run_agent(config: Config, store: StoreHandle) -> Result<()> {
    let identity = AgentIdentity::generate();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let leases = Arc::new(LeaseManager::new(
        store.clone(),
        identity,
        clock.clone(),
        &config,
    ));

    println!("agent {} starting", identity);

    let monitor = LeaseMonitor::new(
        leases.clone(),
        store.clone(),
        Arc::new(LogNotifier),
        config.monitor_tick(),
    );
    let monitor_shutdown = monitor.shutdown_handle();
    let monitor_task = tokio::spawn(monitor.run());

    let generator = ContentGenerator::new(
        store.clone(),
        ContentTemplate::builtin(),
        config.max_history,
        config.max_generate_attempts,
    );
    let core = SchedulerCore::new(
        store.clone(),
        leases.clone(),
        generator,
        Arc::new(LogAction),
        Arc::new(AlwaysReady),
        clock,
        config.clone(),
    );
    let runner = SchedulerRunner::new(core, config.monitor_tick());
    let runner_cancel = runner.cancel_handle();
    let runner_task = tokio::spawn(runner.run());

    tokio::signal::ctrl_c().await?;
    println!("shutting down");

    runner_cancel.notify_one();
    monitor_shutdown.notify_one();
    runner_task.await?;
    monitor_task.await?;

    println!("agent {} stopped", identity);
    Ok(())
}
