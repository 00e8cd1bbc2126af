// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Job Registry: the in-memory set of declared jobs plus the `reload` and
//! `change_job_state` operations everything else goes through
//! (`spec.md` §4.2, §5).

use crate::error::RegistryError;
use chrono::NaiveDate;
use flowctl_bus::{BusClient, Message, MessageKind};
use flowctl_core::{Clock, ConfigOverrides, ConfigSource, DeploymentConfig, Job, JobState};
use flowctl_ledger::Ledger;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

struct RegistryState {
    config: DeploymentConfig,
    last_reload_date: NaiveDate,
}

/// Owns the current [`DeploymentConfig`] behind a single mutex (`spec.md`
/// §5: "all mutations... pass through a `change_job_state` path guarded by
/// a single registry mutex"). Generic over the clock and configuration
/// source the way the teacher's `Runtime<A, N, C>` is generic over its
/// adapters, so tests can supply a `FakeClock` and a `StaticConfigSource`.
pub struct Registry<C: Clock, S: ConfigSource> {
    state: Mutex<RegistryState>,
    ledger: Arc<Ledger>,
    config_source: S,
    overrides: ConfigOverrides,
    clock: C,
}

impl<C: Clock, S: ConfigSource> Registry<C, S> {
    /// Construct the registry with an initial `reload` performed in-memory,
    /// with no bus yet (`spec.md` §4.2's parenthetical in step 7).
    pub fn new(config_source: S, clock: C, overrides: ConfigOverrides) -> Result<Self, RegistryError> {
        let raw = config_source.load()?;
        let mut config = DeploymentConfig::from_raw(raw, &config_source.config_dir(), &overrides)?;
        arm_all_crons(&mut config, &clock);
        config.apply_notification_defaults();

        let ledger = Arc::new(Ledger::new(&config.ledger_dir, &config.uid));
        replay_ledger(&ledger, &clock, &mut config)?;

        Ok(Self {
            state: Mutex::new(RegistryState {
                last_reload_date: clock.now().date_naive(),
                config,
            }),
            ledger,
            config_source,
            overrides,
            clock,
        })
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn uid(&self) -> String {
        self.state.lock().config.uid.clone()
    }

    pub fn title(&self) -> String {
        self.state.lock().config.title.clone()
    }

    pub fn config_dir(&self) -> std::path::PathBuf {
        self.state.lock().config.config_dir.clone()
    }

    pub fn job_logs_dir(&self) -> std::path::PathBuf {
        self.state.lock().config.job_logs_dir.clone()
    }

    pub fn email_sender(&self) -> Option<String> {
        self.state.lock().config.email_sender.clone()
    }

    pub fn last_reload_date(&self) -> NaiveDate {
        self.state.lock().last_reload_date
    }

    /// Re-run the full 7-step reload sequence (`spec.md` §4.2). Publishes
    /// `config_changed` when `bus` is present; the initial `reload` inside
    /// [`Registry::new`] has no bus yet and calls the private helper
    /// directly instead of going through here.
    pub async fn reload(&self, bus: Option<&dyn BusClient>) -> Result<(), RegistryError> {
        let raw = self.config_source.load()?;
        let mut config = DeploymentConfig::from_raw(raw, &self.config_source.config_dir(), &self.overrides)?;
        arm_all_crons(&mut config, &self.clock);
        config.apply_notification_defaults();
        replay_ledger(&self.ledger, &self.clock, &mut config)?;

        {
            let mut state = self.state.lock();
            state.last_reload_date = self.clock.now().date_naive();
            state.config = config;
        }

        info!(uid = %self.uid(), "registry reloaded");
        if let Some(bus) = bus {
            let msg = Message::broadcast(MessageKind::ConfigChanged, self.uid(), Value::Null);
            if let Err(err) = bus.send_message(msg).await {
                warn!(%err, "failed to publish config_changed");
            }
        }
        Ok(())
    }

    /// A deep-copied snapshot of the configuration with every job's state
    /// rendered as its string name (`spec.md` §4.5, `request_config`).
    pub fn snapshot(&self) -> Value {
        let state = self.state.lock();
        let config = &state.config;
        let jobs: serde_json::Map<String, Value> = config
            .jobs
            .values()
            .map(|job| {
                let mut value = serde_json::to_value(job).unwrap_or(Value::Null);
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("state".to_string(), Value::String(job.state.to_string()));
                }
                (job.name.clone(), value)
            })
            .collect();

        serde_json::json!({
            "uid": config.uid,
            "title": config.title,
            "logo_filename": config.logo_filename,
            "smq_server": config.smq_server,
            "jobs": Value::Object(jobs),
        })
    }

    pub fn get_job(&self, name: &str) -> Option<Job> {
        self.state.lock().config.jobs.get(name).cloned()
    }

    /// Every job's current name + state, in declaration order (used by
    /// `--status` and the Scheduler Loop's promotion pass).
    pub fn jobs_in_order(&self) -> Vec<Job> {
        self.state.lock().config.jobs.values().cloned().collect()
    }

    /// Resolve `{config_dir}/{logo_filename}` for the `request_icon` handler
    /// (`spec.md` §4.5).
    pub fn logo_path(&self) -> std::path::PathBuf {
        let state = self.state.lock();
        state.config.config_dir.join(&state.config.logo_filename)
    }

    /// Transition one job directly to `new_state`, append the ledger row,
    /// and (when `bus` is present) publish `job_state_changed` (`spec.md`
    /// §4.5 `change_job_state`, §5 ordering guarantee).
    pub async fn change_job_state(
        &self,
        job_name: &str,
        new_state: JobState,
        reason: &str,
        bus: Option<&dyn BusClient>,
    ) -> Result<(), RegistryError> {
        {
            let mut state = self.state.lock();
            let job = state
                .config
                .jobs
                .get_mut(job_name)
                .ok_or_else(|| RegistryError::UnknownJob(job_name.to_string()))?;
            job.state = new_state;
            self.ledger.append(&self.clock, job_name, new_state, reason)?;
        }

        if let Some(bus) = bus {
            let payload = serde_json::json!({"job_name": job_name, "new_state": new_state.to_string()});
            let msg = Message::broadcast(MessageKind::JobStateChanged, self.uid(), payload);
            if let Err(err) = bus.send_message(msg).await {
                warn!(%err, job_name, "failed to publish job_state_changed");
            }
        }
        Ok(())
    }

    /// Mutates jobs in place under one mutex acquisition; used by the
    /// Scheduler Loop's promotion pass, which decides several transitions
    /// before any of them need to reach the bus.
    pub(crate) fn with_jobs_mut<R>(&self, f: impl FnOnce(&mut DeploymentConfig) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut state.config)
    }

    /// Re-arm a cron job's `next_cron_fire_time` relative to `now`
    /// (`spec.md` §4.4 step 5: re-arm relative to completion, not the
    /// prior firing). No-op for non-cron jobs or unknown names.
    pub fn rearm_cron(&self, job_name: &str) {
        let now = self.clock.now();
        self.with_jobs_mut(|config| {
            if let Some(job) = config.jobs.get_mut(job_name) {
                if job.is_cron_job() {
                    job.arm_cron(now);
                }
            }
        });
    }

    /// Decide which IDLE jobs are ready to promote this iteration
    /// (`spec.md` §4.3 step 3). Mutates `next_cron_fire_time` for jobs that
    /// fire by cron in the same pass; the caller applies the actual state
    /// transition (ledger append + bus publish) via [`Registry::change_job_state`].
    pub(crate) fn decide_promotions(&self, process_cron: bool) -> Vec<(String, &'static str)> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let config = &mut state.config;

        let snapshot_states: std::collections::HashMap<String, JobState> =
            config.jobs.iter().map(|(name, job)| (name.clone(), job.state)).collect();

        let mut promotions = Vec::new();
        for job in config.jobs.values_mut() {
            if job.state != JobState::Idle {
                continue;
            }
            if job.is_dependency_job() {
                let ready = job
                    .depends
                    .iter()
                    .all(|parent| matches!(snapshot_states.get(parent), Some(JobState::Success)));
                if ready {
                    promotions.push((job.name.clone(), "Dependencies Ready"));
                    continue;
                }
            }
            if process_cron && job.cron_is_due(now) {
                job.arm_cron(now);
                promotions.push((job.name.clone(), "cron fire time"));
            }
        }
        promotions
    }
}

fn arm_all_crons(config: &mut DeploymentConfig, clock: &impl Clock) {
    let now = clock.now();
    for job in config.jobs.values_mut() {
        job.arm_cron(now);
    }
}

/// Step 6: replay today's ledger, last row wins, jobs absent from the
/// ledger keep their freshly-reset IDLE state.
fn replay_ledger(ledger: &Ledger, clock: &impl Clock, config: &mut DeploymentConfig) -> Result<(), RegistryError> {
    for entry in ledger.read_today(clock)? {
        if let Some(job) = config.jobs.get_mut(&entry.job_name) {
            job.state = entry.state;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
