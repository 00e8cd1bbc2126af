// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

use super::*;
use flowctl_core::FakeClock;
use chrono::TimeZone;

fn clock_at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> FakeClock {
    FakeClock::new(Local.with_ymd_and_hms(y, m, d, h, mi, s).unwrap())
}

#[test]
fn append_creates_file_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(dir.path(), "demo");
    let clock = clock_at(2026, 1, 1, 10, 0, 0);

    ledger
        .append(&clock, "job1", JobState::Running, "pending")
        .unwrap();

    let path = dir.path().join("demo.20260101.ledger");
    let contents = std::fs::read_to_string(path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("timestamp,job_name,state,reason"));
    assert_eq!(
        lines.next(),
        Some("2026-01-01 10:00:00,job1,RUNNING,pending")
    );
}

#[test]
fn each_append_produces_exactly_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(dir.path(), "demo");
    let clock = clock_at(2026, 1, 1, 10, 0, 0);

    ledger
        .append(&clock, "job1", JobState::Pending, "Dependencies Ready")
        .unwrap();
    ledger
        .append(&clock, "job1", JobState::Running, "pending")
        .unwrap();
    ledger
        .append(&clock, "job1", JobState::Success, "Job Completed")
        .unwrap();

    let rows = ledger.read(clock.now().date_naive()).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].state, JobState::Pending);
    assert_eq!(rows[2].state, JobState::Success);
}

#[test]
fn read_on_missing_file_returns_empty_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(dir.path(), "demo");
    let date = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().date_naive();
    let rows = ledger.read(date).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn reason_containing_a_comma_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(dir.path(), "demo");
    let clock = clock_at(2026, 1, 1, 10, 0, 0);

    ledger
        .append(&clock, "job1", JobState::Failure, "exit 1, see log")
        .unwrap();

    let rows = ledger.read(clock.now().date_naive()).unwrap();
    assert_eq!(rows[0].reason, "exit 1, see log");
}

#[test]
fn rows_for_different_dates_land_in_different_files() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(dir.path(), "demo");

    ledger
        .append(&clock_at(2026, 1, 1, 23, 59, 0), "job1", JobState::Success, "done")
        .unwrap();
    ledger
        .append(&clock_at(2026, 1, 2, 0, 1, 0), "job1", JobState::Running, "pending")
        .unwrap();

    let day1 = ledger
        .read(Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().date_naive())
        .unwrap();
    let day2 = ledger
        .read(Local.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap().date_naive())
        .unwrap();
    assert_eq!(day1.len(), 1);
    assert_eq!(day2.len(), 1);
}
