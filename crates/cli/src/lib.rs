// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flowctl-cli: the terminal-mode CLI surface described in `spec.md` §6 —
//! `--start` runs the Daemon Shell in the foreground of this binary;
//! `--list`/`--status`/`--action` are short-lived bus clients that talk to
//! an already-running orchestrator over the same [`LocalBus`].

pub mod error;
pub mod exit_error;

use clap::Parser;
use error::CliError;
use exit_error::ExitError;
use flowctl_bus::{BusClient, ConstructMsg, HandlerReply, LocalBus, LocalBusClient, MessageKind};
use flowctl_core::{ConfigOverrides, ConfigSource, ExternalProcessConfigSource, SystemClock};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// The `flowctl` CLI argument surface, matching the table in `spec.md` §6.
#[derive(Parser, Debug)]
#[command(name = "flowctl", about = "FlowController job orchestrator")]
pub struct Cli {
    /// Path to the configuration executable; its standard output is parsed
    /// as the deployment's configuration mapping.
    #[arg(long)]
    pub config: PathBuf,

    /// Run the orchestrator in the foreground.
    #[arg(long)]
    pub start: bool,

    /// Print `{client_name}\t{info}` for every bus peer.
    #[arg(long)]
    pub list: bool,

    /// Request the running orchestrator's configuration and print each
    /// job's name and state.
    #[arg(long)]
    pub status: bool,

    /// Send a named action (a bus message kind) as a request to the
    /// running orchestrator.
    #[arg(long = "action")]
    pub action: Option<String>,

    #[arg(long)]
    pub job_name: Option<String>,

    #[arg(long)]
    pub new_state: Option<String>,

    #[arg(long)]
    pub log_range: Option<String>,

    #[arg(long = "override_smq_server")]
    pub override_smq_server: Option<String>,
    #[arg(long = "override_ledger_dir")]
    pub override_ledger_dir: Option<String>,
    #[arg(long = "override_job_logs_dir")]
    pub override_job_logs_dir: Option<String>,
    #[arg(long = "override_email_sender")]
    pub override_email_sender: Option<String>,
    #[arg(long = "override_success_email_recipients")]
    pub override_success_email_recipients: Option<String>,
    #[arg(long = "override_failure_email_recipients")]
    pub override_failure_email_recipients: Option<String>,
    #[arg(long = "override_success_slack_webhook")]
    pub override_success_slack_webhook: Option<String>,
    #[arg(long = "override_failure_slack_webhook")]
    pub override_failure_slack_webhook: Option<String>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            smq_server: self.override_smq_server.clone(),
            ledger_dir: self.override_ledger_dir.clone(),
            job_logs_dir: self.override_job_logs_dir.clone(),
            email_sender: self.override_email_sender.clone(),
            success_email_recipients: self.override_success_email_recipients.clone(),
            failure_email_recipients: self.override_failure_email_recipients.clone(),
            success_slack_webhook: self.override_success_slack_webhook.clone(),
            failure_slack_webhook: self.override_failure_slack_webhook.clone(),
        }
    }
}

/// Dispatch one invocation. Flags are checked in the order listed in
/// `spec.md` §6; `--start` wins if several are set.
pub async fn run(cli: Cli, bus: &LocalBus) -> anyhow::Result<()> {
    if cli.start {
        return cmd_start(&cli, bus).await.map_err(to_anyhow);
    }
    if cli.list {
        return cmd_list(bus).await.map_err(to_anyhow);
    }

    let uid = config_uid(&cli).map_err(to_anyhow)?;

    if cli.status {
        return cmd_status(&uid, bus).await.map_err(to_anyhow);
    }
    if let Some(action) = cli.action.clone() {
        return cmd_action(&uid, &action, &cli, bus).await.map_err(to_anyhow);
    }

    Err(to_anyhow(CliError::UnknownAction(
        "one of --start, --list, --status, --action is required".to_string(),
    )))
}

fn to_anyhow(err: CliError) -> anyhow::Error {
    anyhow::Error::new(ExitError::from(err))
}

fn config_uid(cli: &Cli) -> Result<String, CliError> {
    let source = ExternalProcessConfigSource::new(&cli.config);
    Ok(source.load()?.uid)
}

async fn cmd_start(cli: &Cli, bus: &LocalBus) -> Result<(), CliError> {
    let source = ExternalProcessConfigSource::new(&cli.config);
    flowctl_daemon::shell::run(source, SystemClock, cli.overrides(), bus).await?;
    Ok(())
}

async fn open_terminal(bus: &LocalBus) -> Result<Arc<LocalBusClient>, CliError> {
    let terminal_id = format!("terminal-{}", nanoid::nanoid!(8));
    let terminal = bus.client(terminal_id);
    terminal.start(Vec::new(), Value::Null).await?;
    Ok(terminal)
}

async fn cmd_list(bus: &LocalBus) -> Result<(), CliError> {
    let terminal = open_terminal(bus).await?;
    let peers = terminal.get_info_for_all_clients().await;
    terminal.stop().await?;
    for line in list_lines(peers?) {
        println!("{line}");
    }
    Ok(())
}

/// Render `{client_name}\t{info}` per peer (`spec.md` §6), split out from
/// [`cmd_list`] so the rendering can be asserted on without capturing
/// stdout.
fn list_lines(peers: HashMap<String, flowctl_bus::PeerInfo>) -> Vec<String> {
    peers
        .iter()
        .map(|(name, info)| format!("{name}\t{}", serde_json::to_string(info).unwrap_or_default()))
        .collect()
}

/// Send `kind`/`payload` to the orchestrator identified by `uid` (the
/// orchestrator's own bus client id is its uid, per the Daemon Shell's
/// startup sequence) and unwrap the `{retval, ...}` reply shape.
async fn request(client: &dyn BusClient, uid: &str, kind: MessageKind, payload: Value) -> Result<HashMap<String, Value>, CliError> {
    let msg = client.construct_msg(kind, uid, payload);
    let reply = match client.send_request(msg, flowctl_bus::DEFAULT_REQUEST_TIMEOUT).await {
        Ok(value) => value,
        Err(flowctl_bus::BusError::Timeout { .. } | flowctl_bus::BusError::UnknownPeer(_)) => {
            return Err(CliError::Unreachable { uid: uid.to_string() });
        }
        Err(other) => return Err(CliError::Bus(other)),
    };

    let reply: HandlerReply = serde_json::from_value(reply).unwrap_or_else(|_| HandlerReply::ok());
    if reply.retval != 0 {
        let message = reply
            .extra
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(CliError::RemoteError(message));
    }
    Ok(reply.extra)
}

async fn cmd_status(uid: &str, bus: &LocalBus) -> Result<(), CliError> {
    let terminal = open_terminal(bus).await?;
    let result = request(terminal.as_ref(), uid, MessageKind::RequestConfig, Value::Null).await;
    terminal.stop().await?;
    for line in status_lines(&result?) {
        println!("{line}");
    }
    Ok(())
}

/// Render `{job_name}: {STATE}` per job, in the order `request_config`
/// returned them (`spec.md` §6, declaration order per `spec.md` §4.2).
fn status_lines(extra: &HashMap<String, Value>) -> Vec<String> {
    let jobs = extra
        .get("config")
        .and_then(|config| config.get("jobs"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    jobs.iter()
        .map(|(name, job)| {
            let state = job.get("state").and_then(Value::as_str).unwrap_or("UNKNOWN");
            format!("{name}: {state}")
        })
        .collect()
}

async fn cmd_action(uid: &str, action: &str, cli: &Cli, bus: &LocalBus) -> Result<(), CliError> {
    let kind: MessageKind = action.parse().map_err(|_| CliError::UnknownAction(action.to_string()))?;
    let payload = action_payload(kind, action, cli)?;

    let terminal = open_terminal(bus).await?;
    let result = request(terminal.as_ref(), uid, kind, payload).await;
    terminal.stop().await?;
    let extra = result?;

    println!("{}", serde_json::to_string_pretty(&extra).unwrap_or_default());
    Ok(())
}

fn action_payload(kind: MessageKind, action: &str, cli: &Cli) -> Result<Value, CliError> {
    let job_name = || {
        cli.job_name
            .clone()
            .ok_or_else(|| CliError::MissingJobName { action: action.to_string() })
    };

    Ok(match kind {
        MessageKind::TriggerJob => serde_json::json!({"job_name": job_name()?, "reason": "cli trigger_job"}),
        MessageKind::ChangeJobState => {
            let new_state = cli
                .new_state
                .clone()
                .ok_or_else(|| CliError::MissingNewState { action: action.to_string() })?;
            serde_json::json!({"job_name": job_name()?, "new_state": new_state, "reason": "cli change_job_state"})
        }
        MessageKind::RequestLogChunk => {
            serde_json::json!({"job_name": job_name()?, "range": cli.log_range.clone().unwrap_or_default()})
        }
        _ => Value::Null,
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
