// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Daemon Shell: the startup/shutdown sequence wrapped around the
//! Scheduler Loop (`spec.md` §4.6).

use crate::adapter::{self, classifications_and_tag};
use crate::error::DaemonError;
use flowctl_bus::{ping, BusClient, LocalBus};
use flowctl_core::{Clock, ConfigOverrides, ConfigSource};
use flowctl_engine::{Notifier, ProcessRunner, Registry, Scheduler};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Build the registry, enforce bus uniqueness, install signal handlers,
/// then drive the Scheduler Loop to completion (`spec.md` §4.6 steps 1-7).
/// `bus` stands in for the external message bus (`spec.md` §9); a real
/// deployment and its tests share the same in-process [`LocalBus`].
pub async fn run<C, S>(config_source: S, clock: C, overrides: ConfigOverrides, bus: &LocalBus) -> Result<(), DaemonError>
where
    C: Clock + 'static,
    S: ConfigSource + 'static,
{
    // 1. Build the registry (no bus yet) to read the UID.
    let registry = Arc::new(Registry::new(config_source, clock.clone(), overrides)?);
    let uid = registry.uid();

    // 2. Create ledger and log directories if missing.
    create_dir(registry.ledger().dir())?;
    create_dir(&registry.job_logs_dir())?;

    // 3. Uniqueness check via a short-lived terminal bus client.
    check_uniqueness(bus, &uid).await?;

    // 4. Open the primary bus client and register handlers.
    let primary = bus.client(&uid);
    let (classifications, tag) = classifications_and_tag(&uid, &registry.title());
    primary.start(classifications, tag).await?;
    adapter::register(primary.as_ref(), registry.clone());

    // 5. Install signal handlers for interrupt and termination.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_signal_listener(shutdown_tx);

    // 6. Enter the Scheduler Loop.
    let runner = Arc::new(ProcessRunner::new(clock.clone(), Arc::new(Notifier::new())));
    let mut scheduler = Scheduler::new(registry, runner, clock);
    info!(%uid, "orchestrator entering scheduler loop");
    let bus_client: Arc<dyn BusClient> = primary.clone();
    scheduler.run(bus_client, shutdown_rx).await;

    // 7. On shutdown, stop the bus client.
    primary.stop().await?;
    info!(%uid, "orchestrator shut down cleanly");
    Ok(())
}

async fn check_uniqueness(bus: &LocalBus, uid: &str) -> Result<(), DaemonError> {
    let terminal_id = format!("terminal-{}", nanoid::nanoid!(8));
    let terminal = bus.client(&terminal_id);
    terminal.start(Vec::new(), Value::Null).await?;

    let peers = terminal.get_info_for_all_clients().await?;
    for (name, info) in &peers {
        if info.classifications.iter().any(|c| c == uid) && ping(terminal.as_ref(), name).await? {
            terminal.stop().await?;
            return Err(DaemonError::AlreadyRunning { uid: uid.to_string() });
        }
    }

    terminal.stop().await?;
    Ok(())
}

fn create_dir(path: &std::path::Path) -> Result<(), DaemonError> {
    std::fs::create_dir_all(path).map_err(|source| DaemonError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn spawn_signal_listener(tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        warn!("shutdown signal received");
        let _ = tx.send(true);
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            warn!(%err, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
            unreachable!()
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
