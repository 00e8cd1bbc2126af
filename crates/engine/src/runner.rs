// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Process Runner: spawns a job's command, streams its output into the
//! daily log, and reports its terminal state back through the Job Registry
//! (`spec.md` §4.4).

use crate::notifier::Notifier;
use crate::registry::Registry;
use chrono::Local;
use flowctl_bus::{BusClient, Message, MessageKind};
use flowctl_core::{Clock, ConfigSource, Job, JobState};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BANNER: &str = "FlowController Starting Job";

pub struct ProcessRunner<C: Clock> {
    clock: C,
    notifier: Arc<Notifier>,
}

impl<C: Clock + 'static> ProcessRunner<C> {
    pub fn new(clock: C, notifier: Arc<Notifier>) -> Self {
        Self { clock, notifier }
    }

    /// Dispatch one RUNNING job onto its own task; multiple jobs may run
    /// concurrently (`spec.md` §4.4, "Concurrency").
    pub fn spawn<S>(self: &Arc<Self>, registry: Arc<Registry<C, S>>, bus: Arc<dyn BusClient>, job_name: String)
    where
        S: ConfigSource + 'static,
    {
        let runner = Arc::clone(self);
        tokio::spawn(async move {
            runner.run(registry, bus, job_name).await;
        });
    }

    async fn run<S: ConfigSource + 'static>(
        &self,
        registry: Arc<Registry<C, S>>,
        bus: Arc<dyn BusClient>,
        job_name: String,
    ) {
        let Some(job) = registry.get_job(&job_name) else {
            warn!(job_name, "runner invoked for a job no longer in the registry");
            return;
        };

        let uid = registry.uid();
        let log_path = log_path_for(&registry.job_logs_dir(), &uid, &job_name, self.clock.now());

        let mut log_file = match open_log(&log_path).await {
            Ok(file) => file,
            Err(err) => {
                error!(%err, job_name, "failed to open job log");
                self.finish(&registry, &bus, &job, JobState::Failure, "Job Error", err.to_string())
                    .await;
                return;
            }
        };
        write_banner(&mut log_file).await;

        let Some(run_cmd) = job.run_cmd.clone() else {
            let _ = log_line(&mut log_file, self.clock.now(), "missing run_cmd").await;
            self.finish(
                &registry,
                &bus,
                &job,
                JobState::Failure,
                "missing run_cmd",
                "missing run_cmd".to_string(),
            )
            .await;
            return;
        };

        let cwd = registry.config_dir();
        match self.run_child(&mut log_file, &cwd, &run_cmd, &bus, &uid, &job_name).await {
            Ok((success, buffer)) => {
                let state = if success { JobState::Success } else { JobState::Failure };
                self.finish(&registry, &bus, &job, state, "Job Completed", buffer).await;
                if success && job.is_cron_job() {
                    registry.rearm_cron(&job_name);
                }
            }
            Err(err) => {
                let _ = log_line(&mut log_file, self.clock.now(), &format!("Job Error: {err}")).await;
                self.finish(&registry, &bus, &job, JobState::Failure, "Job Error", err.to_string())
                    .await;
            }
        }
    }

    /// Apply the terminal transition and fire notifications. `body` is the
    /// captured output on a completed run, or the error text on a launch
    /// failure.
    async fn finish<S: ConfigSource + 'static>(
        &self,
        registry: &Registry<C, S>,
        bus: &Arc<dyn BusClient>,
        job: &Job,
        state: JobState,
        reason: &str,
        body: String,
    ) {
        if let Err(err) = registry
            .change_job_state(&job.name, state, reason, Some(bus.as_ref()))
            .await
        {
            error!(%err, job_name = %job.name, "failed to record terminal job state");
        }

        let outcome = if state == JobState::Success { "SUCCESS" } else { "FAILURE" };
        let (recipients, webhook) = if state == JobState::Success {
            (job.success_email_recipients.clone(), job.success_slack_webhook.clone())
        } else {
            (job.failure_email_recipients.clone(), job.failure_slack_webhook.clone())
        };
        self.notifier
            .notify(registry.email_sender(), &job.name, outcome, recipients, webhook, body);
    }

    /// Spawn `run_cmd` under the platform shell, stream merged output into
    /// the log and as `job_log_changed` broadcasts, and return the exit
    /// success flag plus the full captured output.
    async fn run_child(
        &self,
        log_file: &mut tokio::fs::File,
        cwd: &Path,
        run_cmd: &str,
        bus: &Arc<dyn BusClient>,
        uid: &str,
        job_name: &str,
    ) -> std::io::Result<(bool, String)> {
        let mut child = shell_command(run_cmd)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().expect("piped stdout");
        let stderr = child.stderr.take().expect("piped stderr");

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let stdout_tx = tx.clone();
        tokio::spawn(async move { pump_lines(stdout, stdout_tx).await });
        tokio::spawn(async move { pump_lines(stderr, tx).await });

        let mut buffer = String::new();
        while let Some(line) = rx.recv().await {
            log_line(log_file, self.clock.now(), &line).await?;
            buffer.push_str(&line);
            buffer.push('\n');

            let payload = json!({"job_name": job_name});
            let msg = Message::broadcast(MessageKind::JobLogChanged, uid, payload);
            if let Err(err) = bus.send_message(msg).await {
                warn!(%err, job_name, "failed to publish job_log_changed");
            }
        }

        let status = child.wait().await?;
        Ok((status.success(), buffer))
    }
}

fn shell_command(run_cmd: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-c").arg(run_cmd);
    cmd
}

async fn pump_lines<R: tokio::io::AsyncRead + Unpin>(stream: R, tx: mpsc::UnboundedSender<String>) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).is_err() {
            break;
        }
    }
}

/// `{uid}.{job_name}.{YYYYMMDD}.log` under `dir`. Shared with the Bus
/// Adapter's `request_log_chunk` handler so both writer and reader agree on
/// where a job's log for `now`'s date lives.
pub fn log_path_for(dir: &Path, uid: &str, job_name: &str, now: chrono::DateTime<Local>) -> PathBuf {
    dir.join(format!("{uid}.{job_name}.{}.log", now.format("%Y%m%d")))
}

async fn open_log(path: &Path) -> std::io::Result<tokio::fs::File> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::OpenOptions::new().create(true).append(true).open(path).await
}

async fn write_banner(file: &mut tokio::fs::File) {
    let banner = format!("\n\n{BANNER}\n\n\n");
    let _ = file.write_all(banner.as_bytes()).await;
    let _ = file.flush().await;
}

async fn log_line(file: &mut tokio::fs::File, now: chrono::DateTime<Local>, line: &str) -> std::io::Result<()> {
    let row = format!("{} {}\n", now.format(TIMESTAMP_FORMAT), line);
    file.write_all(row.as_bytes()).await?;
    file.flush().await
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
