// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Deployment configuration: the parsed shape produced by a [`ConfigSource`]
//! and the validated, path-resolved [`DeploymentConfig`] the rest of the
//! core operates on.

use crate::cron_schedule::CronSchedule;
use crate::job::Job;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// One job entry as presented by a configuration source: a flat sequence
/// member carrying its own `name`, rekeyed by the core into a map.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawJob {
    pub name: String,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default)]
    pub cron: Option<String>,
    #[serde(default)]
    pub run_cmd: Option<String>,
    #[serde(default)]
    pub success_email_recipients: Option<String>,
    #[serde(default)]
    pub failure_email_recipients: Option<String>,
    #[serde(default)]
    pub success_slack_webhook: Option<String>,
    #[serde(default)]
    pub failure_slack_webhook: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The as-parsed shape of a configuration source's output, before path
/// resolution and rekeying.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    pub uid: String,
    pub title: String,
    pub logo_filename: String,
    pub ledger_dir: String,
    pub job_logs_dir: String,
    pub smq_server: String,
    #[serde(default)]
    pub email_sender: Option<String>,
    #[serde(default)]
    pub success_email_recipients: Option<String>,
    #[serde(default)]
    pub failure_email_recipients: Option<String>,
    #[serde(default)]
    pub success_slack_webhook: Option<String>,
    #[serde(default)]
    pub failure_slack_webhook: Option<String>,
    pub jobs: Vec<RawJob>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config source failed: {0}")]
    SourceFailed(String),
    #[error("failed to parse config output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("job '{job}' has invalid cron expression: {source}")]
    InvalidCron {
        job: String,
        #[source]
        source: crate::cron_schedule::CronParseError,
    },
}

/// Where a [`DeploymentConfig`] comes from. The core only requires an
/// abstract "load -> mapping" function; the caller decides whether that
/// means shelling out to an executable, reading a static file, or (in
/// tests) returning a value already in memory.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<RawConfig, ConfigError>;

    /// Directory the resolved `ledger_dir`/`job_logs_dir` and job `cwd`
    /// are relative to — the directory containing the configuration file.
    fn config_dir(&self) -> PathBuf;
}

/// A [`ConfigSource`] that returns an already-parsed value, for tests and
/// for embedding a configuration built in-process.
pub struct StaticConfigSource {
    raw: RawConfig,
    config_dir: PathBuf,
}

impl StaticConfigSource {
    pub fn new(raw: RawConfig, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw,
            config_dir: config_dir.into(),
        }
    }
}

impl ConfigSource for StaticConfigSource {
    fn load(&self) -> Result<RawConfig, ConfigError> {
        Ok(self.raw.clone())
    }

    fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }
}

/// A [`ConfigSource`] that shells out to an executable and parses its
/// standard output as the configuration mapping (`spec.md` §6: "any
/// executable that prints a single value (mapping) to standard output").
/// `config_dir` is the directory the resolved `ledger_dir`/`job_logs_dir`
/// are relative to, and defaults to the executable's parent directory.
pub struct ExternalProcessConfigSource {
    executable: PathBuf,
    config_dir: PathBuf,
}

impl ExternalProcessConfigSource {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        let executable = executable.into();
        let config_dir = executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { executable, config_dir }
    }

    pub fn with_config_dir(executable: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            config_dir: config_dir.into(),
        }
    }
}

impl ConfigSource for ExternalProcessConfigSource {
    fn load(&self) -> Result<RawConfig, ConfigError> {
        let output = std::process::Command::new(&self.executable)
            .output()
            .map_err(|err| ConfigError::SourceFailed(format!("failed to run {:?}: {err}", self.executable)))?;

        if !output.status.success() {
            return Err(ConfigError::SourceFailed(format!(
                "{:?} exited with {}: {}",
                self.executable,
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(ConfigError::Parse)
    }

    fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }
}

/// Per-deployment overrides from the CLI (`--override_<key>`). Entries with
/// a `None` value are ignored rather than clearing the field.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub smq_server: Option<String>,
    pub ledger_dir: Option<String>,
    pub job_logs_dir: Option<String>,
    pub email_sender: Option<String>,
    pub success_email_recipients: Option<String>,
    pub failure_email_recipients: Option<String>,
    pub success_slack_webhook: Option<String>,
    pub failure_slack_webhook: Option<String>,
}

/// The validated, path-resolved deployment configuration the rest of the
/// core operates on. `jobs` preserves configuration declaration order,
/// which is the tie-break order the Scheduler Loop uses when several jobs
/// become ready in the same iteration.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub uid: String,
    pub title: String,
    pub logo_filename: String,
    pub ledger_dir: PathBuf,
    pub job_logs_dir: PathBuf,
    pub smq_server: String,
    pub config_dir: PathBuf,
    pub email_sender: Option<String>,
    pub success_email_recipients: Option<String>,
    pub failure_email_recipients: Option<String>,
    pub success_slack_webhook: Option<String>,
    pub failure_slack_webhook: Option<String>,
    pub jobs: IndexMap<String, Job>,
}

impl DeploymentConfig {
    /// Resolve a [`RawConfig`] (plus overrides) into a [`DeploymentConfig`],
    /// per `spec.md` §4.2 step 2 and §6 ("External Interfaces"):
    /// `ledger_dir`/`job_logs_dir` resolve relative to `config_dir`,
    /// `smq_server` is normalized by prepending `http://`, and `jobs` is
    /// rekeyed by name while preserving declaration order.
    pub fn from_raw(
        mut raw: RawConfig,
        config_dir: &Path,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = &overrides.smq_server {
            raw.smq_server = v.clone();
        }
        if let Some(v) = &overrides.ledger_dir {
            raw.ledger_dir = v.clone();
        }
        if let Some(v) = &overrides.job_logs_dir {
            raw.job_logs_dir = v.clone();
        }
        if let Some(v) = &overrides.email_sender {
            raw.email_sender = Some(v.clone());
        }
        if let Some(v) = &overrides.success_email_recipients {
            raw.success_email_recipients = Some(v.clone());
        }
        if let Some(v) = &overrides.failure_email_recipients {
            raw.failure_email_recipients = Some(v.clone());
        }
        if let Some(v) = &overrides.success_slack_webhook {
            raw.success_slack_webhook = Some(v.clone());
        }
        if let Some(v) = &overrides.failure_slack_webhook {
            raw.failure_slack_webhook = Some(v.clone());
        }

        let smq_server = if raw.smq_server.starts_with("http://") || raw.smq_server.starts_with("https://") {
            raw.smq_server.clone()
        } else {
            format!("http://{}", raw.smq_server)
        };

        let mut jobs = IndexMap::with_capacity(raw.jobs.len());
        for raw_job in raw.jobs {
            let cron = raw_job
                .cron
                .as_deref()
                .map(CronSchedule::parse)
                .transpose()
                .map_err(|source| ConfigError::InvalidCron {
                    job: raw_job.name.clone(),
                    source,
                })?;

            let mut job = Job::new(&raw_job.name).with_depends(raw_job.depends);
            job.cron = cron;
            job.run_cmd = raw_job.run_cmd;
            job.success_email_recipients = raw_job.success_email_recipients;
            job.failure_email_recipients = raw_job.failure_email_recipients;
            job.success_slack_webhook = raw_job.success_slack_webhook;
            job.failure_slack_webhook = raw_job.failure_slack_webhook;
            job.extra = raw_job.extra;
            jobs.insert(raw_job.name, job);
        }

        Ok(Self {
            uid: raw.uid,
            title: raw.title,
            logo_filename: raw.logo_filename,
            ledger_dir: config_dir.join(raw.ledger_dir),
            job_logs_dir: config_dir.join(raw.job_logs_dir),
            smq_server,
            config_dir: config_dir.to_path_buf(),
            email_sender: raw.email_sender,
            success_email_recipients: raw.success_email_recipients,
            failure_email_recipients: raw.failure_email_recipients,
            success_slack_webhook: raw.success_slack_webhook,
            failure_slack_webhook: raw.failure_slack_webhook,
            jobs,
        })
    }

    /// Apply deployment-wide notification defaults to every job that did
    /// not set its own (`spec.md` §4.2 step 5).
    pub fn apply_notification_defaults(&mut self) {
        let success_email = self.success_email_recipients.clone();
        let failure_email = self.failure_email_recipients.clone();
        let success_webhook = self.success_slack_webhook.clone();
        let failure_webhook = self.failure_slack_webhook.clone();
        for job in self.jobs.values_mut() {
            job.apply_notification_defaults(
                &success_email,
                &failure_email,
                &success_webhook,
                &failure_webhook,
            );
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
