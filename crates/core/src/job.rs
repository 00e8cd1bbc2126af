// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! A single declared job and its current state.

use crate::cron_schedule::CronSchedule;
use crate::state::JobState;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A declared job: its static definition plus the mutable state the
/// Scheduler Loop advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub state: JobState,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(skip)]
    pub cron: Option<CronSchedule>,
    pub run_cmd: Option<String>,
    pub success_email_recipients: Option<String>,
    pub failure_email_recipients: Option<String>,
    pub success_slack_webhook: Option<String>,
    pub failure_slack_webhook: Option<String>,
    #[serde(skip)]
    pub next_cron_fire_time: Option<DateTime<Local>>,
    /// Presentation attributes (x/y/offsets/width/text_prefix/…) the core
    /// never interprets but must round-trip into `request_config` snapshots.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: JobState::Idle,
            depends: Vec::new(),
            cron: None,
            run_cmd: None,
            success_email_recipients: None,
            failure_email_recipients: None,
            success_slack_webhook: None,
            failure_slack_webhook: None,
            next_cron_fire_time: None,
            extra: Map::new(),
        }
    }

    pub fn with_depends(mut self, depends: Vec<String>) -> Self {
        self.depends = depends;
        self
    }

    pub fn with_cron(mut self, cron: CronSchedule) -> Self {
        self.cron = Some(cron);
        self
    }

    pub fn with_run_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.run_cmd = Some(cmd.into());
        self
    }

    pub fn is_cron_job(&self) -> bool {
        self.cron.is_some()
    }

    pub fn is_dependency_job(&self) -> bool {
        !self.depends.is_empty()
    }

    /// Recompute `next_cron_fire_time` as the first occurrence strictly
    /// after `now`. No-op for jobs without a cron expression.
    pub fn arm_cron(&mut self, now: DateTime<Local>) {
        if let Some(schedule) = &self.cron {
            self.next_cron_fire_time = schedule.next_after(now);
        }
    }

    /// True once `next_cron_fire_time` is in the past relative to `now`.
    pub fn cron_is_due(&self, now: DateTime<Local>) -> bool {
        matches!(self.next_cron_fire_time, Some(fire_time) if fire_time <= now)
    }

    /// Fill in `success_email_recipients`/`failure_email_recipients`/
    /// `success_slack_webhook`/`failure_slack_webhook` from deployment-wide
    /// defaults when the job itself did not set them.
    pub fn apply_notification_defaults(
        &mut self,
        success_email: &Option<String>,
        failure_email: &Option<String>,
        success_webhook: &Option<String>,
        failure_webhook: &Option<String>,
    ) {
        if self.success_email_recipients.is_none() {
            self.success_email_recipients = success_email.clone();
        }
        if self.failure_email_recipients.is_none() {
            self.failure_email_recipients = failure_email.clone();
        }
        if self.success_slack_webhook.is_none() {
            self.success_slack_webhook = success_webhook.clone();
        }
        if self.failure_slack_webhook.is_none() {
            self.failure_slack_webhook = failure_webhook.clone();
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
