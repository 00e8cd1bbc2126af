// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! The record type appended to the daily ledger file (`spec.md` §3, §4.1).

use crate::state::JobState;
use chrono::{DateTime, Local};

/// One row of `{ledger_dir}/{uid}.{YYYYMMDD}.ledger`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub timestamp: DateTime<Local>,
    pub job_name: String,
    pub state: JobState,
    pub reason: String,
}

impl LedgerEntry {
    pub fn new(
        timestamp: DateTime<Local>,
        job_name: impl Into<String>,
        state: JobState,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            job_name: job_name.into(),
            state,
            reason: reason.into(),
        }
    }
}
