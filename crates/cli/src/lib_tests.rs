// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

use super::*;
use chrono::{Local, TimeZone};
use flowctl_core::{FakeClock, RawConfig, RawJob, StaticConfigSource};
use flowctl_engine::Registry;
use serde_json::{json, Map};

fn clock_at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> FakeClock {
    FakeClock::new(Local.with_ymd_and_hms(y, m, d, h, mi, s).unwrap())
}

fn cli_for(config: PathBuf) -> Cli {
    Cli {
        config,
        start: false,
        list: false,
        status: false,
        action: None,
        job_name: None,
        new_state: None,
        log_range: None,
        override_smq_server: None,
        override_ledger_dir: None,
        override_job_logs_dir: None,
        override_email_sender: None,
        override_success_email_recipients: None,
        override_failure_email_recipients: None,
        override_success_slack_webhook: None,
        override_failure_slack_webhook: None,
    }
}

#[test]
fn status_lines_preserves_request_config_declaration_order() {
    let extra: HashMap<String, Value> = serde_json::from_value(json!({
        "config": {
            "jobs": {
                "first": {"state": "IDLE"},
                "second": {"state": "SUCCESS"},
            }
        }
    }))
    .unwrap();
    assert_eq!(status_lines(&extra), vec!["first: IDLE", "second: SUCCESS"]);
}

#[test]
fn status_lines_defaults_to_unknown_when_state_is_absent() {
    let extra: HashMap<String, Value> =
        serde_json::from_value(json!({"config": {"jobs": {"orphan": {}}}})).unwrap();
    assert_eq!(status_lines(&extra), vec!["orphan: UNKNOWN"]);
}

#[test]
fn list_lines_formats_name_and_info_tab_separated() {
    let mut peers = HashMap::new();
    peers.insert(
        "demo".to_string(),
        flowctl_bus::PeerInfo {
            classifications: vec!["FlowController".to_string(), "demo".to_string()],
            tag: json!({"title": "Demo"}),
        },
    );
    let lines = list_lines(peers);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("demo\t{"));
}

#[test]
fn action_payload_requires_job_name_for_trigger_job() {
    let cli = cli_for(PathBuf::from("/nonexistent"));
    let err = action_payload(MessageKind::TriggerJob, "trigger_job", &cli).unwrap_err();
    assert!(matches!(err, CliError::MissingJobName { .. }));
}

#[test]
fn action_payload_requires_new_state_for_change_job_state() {
    let mut cli = cli_for(PathBuf::from("/nonexistent"));
    cli.job_name = Some("leaf".to_string());
    let err = action_payload(MessageKind::ChangeJobState, "change_job_state", &cli).unwrap_err();
    assert!(matches!(err, CliError::MissingNewState { .. }));
}

#[test]
fn action_payload_builds_trigger_job_payload() {
    let mut cli = cli_for(PathBuf::from("/nonexistent"));
    cli.job_name = Some("leaf".to_string());
    let payload = action_payload(MessageKind::TriggerJob, "trigger_job", &cli).unwrap();
    assert_eq!(payload["job_name"], "leaf");
}

#[test]
fn unrecognized_action_name_does_not_parse_as_a_message_kind() {
    assert!("not_a_real_action".parse::<MessageKind>().is_err());
}

fn raw_config(uid: &str) -> RawConfig {
    RawConfig {
        uid: uid.to_string(),
        title: "Demo".to_string(),
        logo_filename: "logo.png".to_string(),
        ledger_dir: "ledger".to_string(),
        job_logs_dir: "logs".to_string(),
        smq_server: "localhost:9000".to_string(),
        email_sender: None,
        success_email_recipients: None,
        failure_email_recipients: None,
        success_slack_webhook: None,
        failure_slack_webhook: None,
        jobs: vec![
            RawJob {
                name: "first".to_string(),
                depends: vec![],
                cron: None,
                run_cmd: Some("exit 0".to_string()),
                success_email_recipients: None,
                failure_email_recipients: None,
                success_slack_webhook: None,
                failure_slack_webhook: None,
                extra: Map::new(),
            },
            RawJob {
                name: "second".to_string(),
                depends: vec!["first".to_string()],
                cron: None,
                run_cmd: Some("exit 0".to_string()),
                success_email_recipients: None,
                failure_email_recipients: None,
                success_slack_webhook: None,
                failure_slack_webhook: None,
                extra: Map::new(),
            },
        ],
    }
}

/// End-to-end against an in-process orchestrator registered on the same
/// bus, exercising `open_terminal`/`request`/`cmd_status`/`cmd_action`
/// together rather than each in isolation.
#[tokio::test]
async fn cmd_status_and_cmd_action_round_trip_against_a_registered_orchestrator() {
    let dir = tempfile::tempdir().unwrap();
    let clock = clock_at(2026, 1, 1, 9, 0, 0);
    let source = StaticConfigSource::new(raw_config("demo"), dir.path());
    let registry = Arc::new(Registry::new(source, clock, flowctl_core::ConfigOverrides::default()).unwrap());

    let bus = LocalBus::new();
    let primary = bus.client("demo");
    primary.start(vec!["FlowController".to_string(), "demo".to_string()], Value::Null).await.unwrap();
    flowctl_daemon::adapter::register(primary.as_ref(), registry.clone());

    cmd_status("demo", &bus).await.unwrap();

    let mut cli = cli_for(dir.path().join("config.sh"));
    cli.job_name = Some("first".to_string());
    cmd_action("demo", "trigger_job", &cli, &bus).await.unwrap();

    let err = cmd_action("demo", "not_a_real_action", &cli, &bus).await.unwrap_err();
    assert!(matches!(err, CliError::UnknownAction(_)));
}

#[tokio::test]
async fn cmd_status_against_an_unregistered_uid_is_unreachable() {
    let bus = LocalBus::new();
    let err = cmd_status("nobody-home", &bus).await.unwrap_err();
    assert!(matches!(err, CliError::Unreachable { .. }));
}
