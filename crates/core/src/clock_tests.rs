// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

use super::*;
use chrono::TimeZone;

#[test]
fn fake_clock_advances_by_duration() {
    let start = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = FakeClock::new(start);
    clock.advance(chrono::Duration::seconds(90));
    assert_eq!(clock.now(), start + chrono::Duration::seconds(90));
}

#[test]
fn fake_clock_set_overrides_current_time() {
    let start = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let later = Local.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
    let clock = FakeClock::new(start);
    clock.set(later);
    assert_eq!(clock.now(), later);
}

#[test]
fn system_clock_now_is_recent() {
    let clock = SystemClock;
    let delta = Local::now().signed_duration_since(clock.now());
    assert!(delta.num_seconds().abs() < 5);
}
