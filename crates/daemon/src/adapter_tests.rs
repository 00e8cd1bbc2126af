// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

use super::*;
use chrono::{Local, TimeZone};
use flowctl_bus::{ConstructMsg, LocalBus};
use flowctl_core::{ConfigOverrides, FakeClock, RawConfig, RawJob, StaticConfigSource};
use serde_json::Map;

fn clock_at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> FakeClock {
    FakeClock::new(Local.with_ymd_and_hms(y, m, d, h, mi, s).unwrap())
}

fn job(name: &str) -> RawJob {
    RawJob {
        name: name.to_string(),
        depends: vec![],
        cron: None,
        run_cmd: Some("exit 0".to_string()),
        success_email_recipients: None,
        failure_email_recipients: None,
        success_slack_webhook: None,
        failure_slack_webhook: None,
        extra: Map::new(),
    }
}

fn registry_for(dir: &std::path::Path, clock: FakeClock) -> Arc<Registry<FakeClock, StaticConfigSource>> {
    let raw = RawConfig {
        uid: "demo".to_string(),
        title: "Demo".to_string(),
        logo_filename: "logo.png".to_string(),
        ledger_dir: dir.to_string_lossy().to_string(),
        job_logs_dir: dir.to_string_lossy().to_string(),
        smq_server: "localhost:9000".to_string(),
        email_sender: None,
        success_email_recipients: None,
        failure_email_recipients: None,
        success_slack_webhook: None,
        failure_slack_webhook: None,
        jobs: vec![job("leaf")],
    };
    let source = StaticConfigSource::new(raw, dir);
    Arc::new(Registry::new(source, clock, ConfigOverrides::default()).unwrap())
}

#[tokio::test]
async fn ping_replies_ok() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_for(dir.path(), clock_at(2026, 1, 1, 9, 0, 0));
    let bus = LocalBus::new();
    let server = bus.client("demo");
    register(server.as_ref(), registry);

    let caller = bus.client("terminal");
    let reply = caller
        .send_request(caller.construct_msg(MessageKind::Ping, "demo", Value::Null), std::time::Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(reply["retval"], 0);
}

#[tokio::test]
async fn trigger_job_transitions_to_pending() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_for(dir.path(), clock_at(2026, 1, 1, 9, 0, 0));
    let bus = LocalBus::new();
    let server = bus.client("demo");
    register(server.as_ref(), registry.clone());

    let caller = bus.client("terminal");
    let payload = json!({"job_name": "leaf", "reason": "manual"});
    let reply = caller
        .send_request(
            caller.construct_msg(MessageKind::TriggerJob, "demo", payload),
            std::time::Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert_eq!(reply["retval"], 0);
    assert_eq!(registry.get_job("leaf").unwrap().state, JobState::Pending);
}

#[tokio::test]
async fn change_job_state_rejects_unknown_state_name() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_for(dir.path(), clock_at(2026, 1, 1, 9, 0, 0));
    let bus = LocalBus::new();
    let server = bus.client("demo");
    register(server.as_ref(), registry);

    let caller = bus.client("terminal");
    let payload = json!({"job_name": "leaf", "new_state": "BOGUS"});
    let reply = caller
        .send_request(
            caller.construct_msg(MessageKind::ChangeJobState, "demo", payload),
            std::time::Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert_eq!(reply["retval"], 1);
}

#[tokio::test]
async fn request_config_includes_job_state_as_string() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_for(dir.path(), clock_at(2026, 1, 1, 9, 0, 0));
    let bus = LocalBus::new();
    let server = bus.client("demo");
    register(server.as_ref(), registry);

    let caller = bus.client("terminal");
    let reply = caller
        .send_request(
            caller.construct_msg(MessageKind::RequestConfig, "demo", Value::Null),
            std::time::Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert_eq!(reply["config"]["jobs"]["leaf"]["state"], "IDLE");
}

#[tokio::test]
async fn request_log_chunk_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_for(dir.path(), clock_at(2026, 1, 1, 9, 0, 0));
    let bus = LocalBus::new();
    let server = bus.client("demo");
    register(server.as_ref(), registry);

    let caller = bus.client("terminal");
    let payload = json!({"job_name": "leaf", "range": ""});
    let reply = caller
        .send_request(
            caller.construct_msg(MessageKind::RequestLogChunk, "demo", payload),
            std::time::Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert!(reply["log"].as_str().unwrap().contains("no log file found"));
}

#[tokio::test]
async fn request_log_chunk_slices_the_prefixed_content_not_the_raw_file() {
    let dir = tempfile::tempdir().unwrap();
    let clock = clock_at(2026, 1, 1, 9, 0, 0);
    let registry = registry_for(dir.path(), clock.clone());
    let bus = LocalBus::new();
    let server = bus.client("demo");
    register(server.as_ref(), registry);

    let path = flowctl_engine::log_path_for(dir.path(), "demo", "leaf", clock.now());
    std::fs::write(&path, "hello world").unwrap();
    let filename = path.file_name().unwrap().to_string_lossy().to_string();
    let prefixed = format!("{filename}\n-----\nhello world");

    let caller = bus.client("terminal");
    let payload = json!({"job_name": "leaf", "range": "0:5"});
    let reply = caller
        .send_request(
            caller.construct_msg(MessageKind::RequestLogChunk, "demo", payload),
            std::time::Duration::from_secs(1),
        )
        .await
        .unwrap();

    let expected: String = prefixed.chars().take(5).collect();
    assert_eq!(reply["log"].as_str().unwrap(), expected);
}

#[test]
fn slice_by_range_supports_open_ended_bounds() {
    assert_eq!(slice_by_range("hello world", ""), "hello world");
    assert_eq!(slice_by_range("hello world", ":5"), "hello");
    assert_eq!(slice_by_range("hello world", "6:"), "world");
    assert_eq!(slice_by_range("hello world", "2:5"), "llo");
}
