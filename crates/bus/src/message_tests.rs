// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

use super::*;
use yare::parameterized;

#[parameterized(
    ping = { MessageKind::Ping, "ping" },
    reload = { MessageKind::ReloadConfig, "reload_config" },
    request_config = { MessageKind::RequestConfig, "request_config" },
    request_icon = { MessageKind::RequestIcon, "request_icon" },
    request_log_chunk = { MessageKind::RequestLogChunk, "request_log_chunk" },
    trigger_job = { MessageKind::TriggerJob, "trigger_job" },
    change_job_state = { MessageKind::ChangeJobState, "change_job_state" },
    job_state_changed = { MessageKind::JobStateChanged, "job_state_changed" },
    config_changed = { MessageKind::ConfigChanged, "config_changed" },
    job_log_changed = { MessageKind::JobLogChanged, "job_log_changed" },
)]
fn kind_round_trips_through_its_wire_string(kind: MessageKind, text: &str) {
    assert_eq!(kind.to_string(), text);
    assert_eq!(text.parse::<MessageKind>().unwrap(), kind);
}

#[test]
fn unknown_kind_is_rejected() {
    assert!("not_a_kind".parse::<MessageKind>().is_err());
}

#[test]
fn broadcast_targets_the_wildcard() {
    let msg = Message::broadcast(MessageKind::JobStateChanged, "flowctl", serde_json::json!({}));
    assert_eq!(msg.target, BROADCAST);
}

#[test]
fn handler_reply_ok_has_zero_retval() {
    let value = HandlerReply::ok().into_value();
    assert_eq!(value["retval"], 0);
}

#[test]
fn handler_reply_error_carries_message() {
    let value = HandlerReply::error("boom").into_value();
    assert_eq!(value["retval"], 1);
    assert_eq!(value["error"], "boom");
}
