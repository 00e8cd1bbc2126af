// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

use super::*;
use chrono::TimeZone;

#[test]
fn new_job_starts_idle_with_no_cron_fire_time() {
    let job = Job::new("build");
    assert_eq!(job.state, JobState::Idle);
    assert!(job.next_cron_fire_time.is_none());
    assert!(!job.is_cron_job());
    assert!(!job.is_dependency_job());
}

#[test]
fn arm_cron_sets_next_fire_time_strictly_in_future() {
    let schedule = CronSchedule::parse("*/5 * * * *").unwrap();
    let mut job = Job::new("nightly").with_cron(schedule);
    let now = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    job.arm_cron(now);
    assert!(job.next_cron_fire_time.unwrap() > now);
}

#[test]
fn arm_cron_is_noop_for_non_cron_job() {
    let mut job = Job::new("manual");
    job.arm_cron(Local::now());
    assert!(job.next_cron_fire_time.is_none());
}

#[test]
fn cron_is_due_only_once_fire_time_has_passed() {
    let schedule = CronSchedule::parse("*/5 * * * *").unwrap();
    let mut job = Job::new("nightly").with_cron(schedule);
    let t0 = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    job.arm_cron(t0);
    let fire_time = job.next_cron_fire_time.unwrap();

    assert!(!job.cron_is_due(fire_time - chrono::Duration::seconds(1)));
    assert!(job.cron_is_due(fire_time));
    assert!(job.cron_is_due(fire_time + chrono::Duration::seconds(1)));
}

#[test]
fn notification_defaults_only_fill_absent_fields() {
    let mut job = Job::new("deploy");
    job.success_email_recipients = Some("job-specific@example.com".to_string());

    job.apply_notification_defaults(
        &Some("default-success@example.com".to_string()),
        &Some("default-failure@example.com".to_string()),
        &Some("https://hooks/success".to_string()),
        &Some("https://hooks/failure".to_string()),
    );

    assert_eq!(
        job.success_email_recipients.as_deref(),
        Some("job-specific@example.com")
    );
    assert_eq!(
        job.failure_email_recipients.as_deref(),
        Some("default-failure@example.com")
    );
    assert_eq!(
        job.success_slack_webhook.as_deref(),
        Some("https://hooks/success")
    );
}

#[test]
fn extra_presentation_fields_round_trip_through_json() {
    let mut job = Job::new("node1");
    job.extra
        .insert("x".to_string(), serde_json::json!(120));
    job.extra
        .insert("text_prefix".to_string(), serde_json::json!("job: "));

    let encoded = serde_json::to_value(&job).unwrap();
    assert_eq!(encoded["x"], serde_json::json!(120));
    assert_eq!(encoded["text_prefix"], serde_json::json!("job: "));

    let decoded: Job = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded.extra.get("x"), Some(&serde_json::json!(120)));
}
