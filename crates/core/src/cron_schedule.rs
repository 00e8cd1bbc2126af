// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Standard 5-field cron expression evaluation.

use chrono::{DateTime, Local};
use cron::Schedule;
use std::str::FromStr;

/// A parsed cron expression, wrapping [`cron::Schedule`].
///
/// The `cron` crate expects 6 or 7 fields (it includes a leading seconds
/// field); a bare 5-field "minute hour day-of-month month day-of-week"
/// expression is normalized by prefixing a `0` seconds field so the
/// standard cron syntax named in the GLOSSARY is accepted as-is.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    schedule: Schedule,
    source: String,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid cron expression '{expr}': {source}")]
pub struct CronParseError {
    expr: String,
    #[source]
    source: cron::error::Error,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, CronParseError> {
        let normalized = normalize(expr);
        let schedule = Schedule::from_str(&normalized).map_err(|source| CronParseError {
            expr: expr.to_string(),
            source,
        })?;
        Ok(Self {
            schedule,
            source: expr.to_string(),
        })
    }

    /// The first occurrence strictly after `after` (never equal to it).
    pub fn next_after(&self, after: DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(&after).next()
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl PartialEq for CronSchedule {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

fn normalize(expr: &str) -> String {
    let fields = expr.split_whitespace().count();
    if fields == 5 {
        format!("0 {expr}")
    } else {
        expr.to_string()
    }
}

#[cfg(test)]
#[path = "cron_schedule_tests.rs"]
mod tests;
