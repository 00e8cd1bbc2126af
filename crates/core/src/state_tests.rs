// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

use super::*;
use yare::parameterized;

#[parameterized(
    idle = { JobState::Idle, "IDLE" },
    pending = { JobState::Pending, "PENDING" },
    running = { JobState::Running, "RUNNING" },
    success = { JobState::Success, "SUCCESS" },
    failure = { JobState::Failure, "FAILURE" },
)]
fn display_matches_ledger_and_bus_rendering(state: JobState, expected: &str) {
    assert_eq!(state.to_string(), expected);
}

#[parameterized(
    idle = { "IDLE", JobState::Idle },
    pending = { "PENDING", JobState::Pending },
    running = { "RUNNING", JobState::Running },
    success = { "SUCCESS", JobState::Success },
    failure = { "FAILURE", JobState::Failure },
)]
fn from_str_round_trips_display(input: &str, expected: JobState) {
    assert_eq!(input.parse::<JobState>().unwrap(), expected);
}

#[test]
fn from_str_rejects_unknown_state() {
    let err = "BOGUS".parse::<JobState>().unwrap_err();
    assert_eq!(err.0, "BOGUS");
}

#[test]
fn only_success_and_failure_are_terminal() {
    assert!(!JobState::Idle.is_terminal());
    assert!(!JobState::Pending.is_terminal());
    assert!(!JobState::Running.is_terminal());
    assert!(JobState::Success.is_terminal());
    assert!(JobState::Failure.is_terminal());
}
