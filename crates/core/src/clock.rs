// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Clock abstraction for testable time handling.

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::Arc;

/// A clock that provides the current local time.
///
/// The scheduler loop, cron evaluation, and ledger/log timestamps all go
/// through this trait so tests can control time without sleeping.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> DateTime<Local>;
}

/// Real wall-clock time.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Fake clock for deterministic scheduler/cron tests.
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<DateTime<Local>>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut guard = self.current.lock();
        *guard += duration;
    }

    pub fn set(&self, instant: DateTime<Local>) {
        *self.current.lock() = instant;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
