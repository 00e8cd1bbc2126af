// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! The job lifecycle state machine.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The five states a job can be in. Transitions happen only through the
/// Job Registry's `change_job_state`/`reload`/scheduler paths — never by
/// direct field mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Idle,
    Pending,
    Running,
    Success,
    Failure,
}

crate::simple_display! {
    JobState {
        Idle => "IDLE",
        Pending => "PENDING",
        Running => "RUNNING",
        Success => "SUCCESS",
        Failure => "FAILURE",
    }
}

/// Error returned when a string does not name one of the five job states.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized job state: {0}")]
pub struct ParseJobStateError(pub String);

impl FromStr for JobState {
    type Err = ParseJobStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDLE" => Ok(JobState::Idle),
            "PENDING" => Ok(JobState::Pending),
            "RUNNING" => Ok(JobState::Running),
            "SUCCESS" => Ok(JobState::Success),
            "FAILURE" => Ok(JobState::Failure),
            other => Err(ParseJobStateError(other.to_string())),
        }
    }
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Success | JobState::Failure)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
