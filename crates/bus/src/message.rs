// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! The message kinds and envelope exchanged over the bus (`spec.md` §4.5).
//!
//! Kinds are a closed sum type internally and a bare string on the wire,
//! the same treatment the GLOSSARY prescribes for job state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Ping,
    ReloadConfig,
    RequestConfig,
    RequestIcon,
    RequestLogChunk,
    TriggerJob,
    ChangeJobState,
    JobStateChanged,
    ConfigChanged,
    JobLogChanged,
}

flowctl_core::simple_display! {
    MessageKind {
        Ping => "ping",
        ReloadConfig => "reload_config",
        RequestConfig => "request_config",
        RequestIcon => "request_icon",
        RequestLogChunk => "request_log_chunk",
        TriggerJob => "trigger_job",
        ChangeJobState => "change_job_state",
        JobStateChanged => "job_state_changed",
        ConfigChanged => "config_changed",
        JobLogChanged => "job_log_changed",
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown message kind '{0}'")]
pub struct ParseMessageKindError(String);

impl FromStr for MessageKind {
    type Err = ParseMessageKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ping" => Self::Ping,
            "reload_config" => Self::ReloadConfig,
            "request_config" => Self::RequestConfig,
            "request_icon" => Self::RequestIcon,
            "request_log_chunk" => Self::RequestLogChunk,
            "trigger_job" => Self::TriggerJob,
            "change_job_state" => Self::ChangeJobState,
            "job_state_changed" => Self::JobStateChanged,
            "config_changed" => Self::ConfigChanged,
            "job_log_changed" => Self::JobLogChanged,
            other => return Err(ParseMessageKindError(other.to_string())),
        })
    }
}

/// The special broadcast target used for outbound events.
pub const BROADCAST: &str = "*";

/// An envelope passed between bus peers. `payload` is an opaque JSON value;
/// handlers deserialize the fields they expect (`{job_name, range}`, `{}`,
/// etc. per `spec.md` §4.5's table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub kind: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub payload: Value,
}

impl Message {
    pub fn new(kind: MessageKind, source: impl Into<String>, target: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.to_string(),
            source: source.into(),
            target: target.into(),
            payload,
        }
    }

    pub fn broadcast(kind: MessageKind, source: impl Into<String>, payload: Value) -> Self {
        Self::new(kind, source, BROADCAST, payload)
    }

    pub fn kind(&self) -> Result<MessageKind, ParseMessageKindError> {
        self.kind.parse()
    }
}

/// A success/failure response payload, matching the `{retval, ...}` shape
/// the original returns from every bus handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerReply {
    pub retval: i32,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl HandlerReply {
    pub fn ok() -> Self {
        Self {
            retval: 0,
            extra: HashMap::new(),
        }
    }

    pub fn ok_with(extra: HashMap<String, Value>) -> Self {
        Self { retval: 0, extra }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut extra = HashMap::new();
        extra.insert("error".to_string(), Value::String(message.into()));
        Self { retval: 1, extra }
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Directory entry returned by `get_info_for_all_clients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub classifications: Vec<String>,
    pub tag: Value,
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
