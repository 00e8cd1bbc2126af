// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Scheduler Loop: the single authoritative routine that advances jobs
//! through promotion and dispatch every 100 ms (`spec.md` §4.3).

use crate::registry::Registry;
use crate::runner::ProcessRunner;
use chrono::{DateTime, Local};
use flowctl_bus::BusClient;
use flowctl_core::{Clock, ConfigSource, JobState};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const CRON_GATE_INTERVAL: chrono::Duration = chrono::Duration::seconds(60);

pub struct Scheduler<C: Clock, S: ConfigSource> {
    registry: Arc<Registry<C, S>>,
    runner: Arc<ProcessRunner<C>>,
    clock: C,
    last_cron_check: Option<DateTime<Local>>,
}

impl<C, S> Scheduler<C, S>
where
    C: Clock + 'static,
    S: ConfigSource + 'static,
{
    pub fn new(registry: Arc<Registry<C, S>>, runner: Arc<ProcessRunner<C>>, clock: C) -> Self {
        Self {
            registry,
            runner,
            clock,
            last_cron_check: None,
        }
    }

    /// Runs the scheduler loop until `shutdown` is signalled. Already
    /// dispatched jobs are not interrupted (`spec.md` §5, "Cancellation").
    pub async fn run(&mut self, bus: Arc<dyn BusClient>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                return;
            }
            if let Err(err) = self.tick(bus.clone()).await {
                error!(%err, "scheduler iteration failed");
            }
            tokio::select! {
                _ = tokio::time::sleep(TICK_INTERVAL) => {}
                _ = shutdown.changed() => {}
            }
        }
    }

    /// One iteration: day rollover, cron gate, promotion, dispatch, in that
    /// order (`spec.md` §4.3).
    pub async fn tick(&mut self, bus: Arc<dyn BusClient>) -> Result<(), crate::error::RegistryError> {
        self.maybe_roll_over_day(bus.as_ref()).await?;
        let process_cron = self.gate_cron();

        let promotions = self.registry.decide_promotions(process_cron);
        for (job_name, reason) in promotions {
            if let Err(err) = self
                .registry
                .change_job_state(&job_name, JobState::Pending, reason, Some(bus.as_ref()))
                .await
            {
                error!(%err, job_name, "failed to promote job");
            }
        }

        self.dispatch(bus).await;
        Ok(())
    }

    async fn maybe_roll_over_day(&self, bus: &dyn BusClient) -> Result<(), crate::error::RegistryError> {
        let today = self.clock.now().date_naive();
        if today != self.registry.last_reload_date() {
            self.registry.reload(Some(bus)).await?;
        }
        Ok(())
    }

    fn gate_cron(&mut self) -> bool {
        let now = self.clock.now();
        let due = match self.last_cron_check {
            None => true,
            Some(last) => now - last >= CRON_GATE_INTERVAL,
        };
        if due {
            self.last_cron_check = Some(now);
        }
        due
    }

    async fn dispatch(&self, bus: Arc<dyn BusClient>) {
        let pending: Vec<String> = self
            .registry
            .jobs_in_order()
            .into_iter()
            .filter(|job| job.state == JobState::Pending)
            .map(|job| job.name)
            .collect();

        for job_name in pending {
            if let Err(err) = self
                .registry
                .change_job_state(&job_name, JobState::Running, "pending", Some(bus.as_ref()))
                .await
            {
                error!(%err, job_name, "failed to dispatch job to running");
                continue;
            }
            self.runner.spawn(self.registry.clone(), bus.clone(), job_name);
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
