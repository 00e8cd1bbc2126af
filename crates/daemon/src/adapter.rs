// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Bus Adapter: translates the inbound message kinds listed in
//! `spec.md` §4.5 into Job Registry operations, and registers the
//! orchestrator's directory entry (`spec.md` §4.6 step 4).

use base64::Engine;
use flowctl_bus::{BusClient, Handler, HandlerFuture, HandlerReply, Message, MessageKind};
use flowctl_core::{Clock, ConfigSource, JobState};
use flowctl_engine::{log_path_for, Registry};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

/// Every inbound kind the adapter subscribes to, in the order listed in
/// `spec.md` §4.5.
pub const INBOUND_KINDS: &[MessageKind] = &[
    MessageKind::Ping,
    MessageKind::ReloadConfig,
    MessageKind::RequestConfig,
    MessageKind::RequestIcon,
    MessageKind::RequestLogChunk,
    MessageKind::TriggerJob,
    MessageKind::ChangeJobState,
];

/// Every kind the orchestrator itself publishes; used for the publisher
/// classification list at startup (`spec.md` §4.6 step 4).
pub const OUTBOUND_KINDS: &[MessageKind] = &[
    MessageKind::ChangeJobState,
    MessageKind::ConfigChanged,
    MessageKind::JobLogChanged,
    MessageKind::JobStateChanged,
];

/// Register one handler per inbound kind against `bus`, closing over
/// `registry`. Job dispatch itself stays the Scheduler Loop's
/// responsibility; `trigger_job`/`change_job_state` only request a
/// transition, the same as any other bus caller.
pub fn register<C, S>(bus: &dyn BusClient, registry: Arc<Registry<C, S>>)
where
    C: Clock + 'static,
    S: ConfigSource + 'static,
{
    bus.add_message_handler(MessageKind::Ping, ping_handler());
    bus.add_message_handler(MessageKind::ReloadConfig, reload_config_handler(registry.clone()));
    bus.add_message_handler(MessageKind::RequestConfig, request_config_handler(registry.clone()));
    bus.add_message_handler(MessageKind::RequestIcon, request_icon_handler(registry.clone()));
    bus.add_message_handler(MessageKind::RequestLogChunk, request_log_chunk_handler(registry.clone()));
    bus.add_message_handler(MessageKind::TriggerJob, trigger_job_handler(registry.clone()));
    bus.add_message_handler(MessageKind::ChangeJobState, change_job_state_handler(registry));
}

fn ping_handler() -> Handler {
    Arc::new(|_msg, _client| -> HandlerFuture { Box::pin(async { HandlerReply::ok().into_value() }) })
}

fn reload_config_handler<C, S>(registry: Arc<Registry<C, S>>) -> Handler
where
    C: Clock + 'static,
    S: ConfigSource + 'static,
{
    Arc::new(move |_msg: Message, client: Arc<dyn BusClient>| -> HandlerFuture {
        let registry = registry.clone();
        Box::pin(async move {
            match registry.reload(Some(client.as_ref())).await {
                Ok(()) => HandlerReply::ok().into_value(),
                Err(err) => {
                    error!(%err, "reload_config handler failed");
                    HandlerReply::error(err.to_string()).into_value()
                }
            }
        })
    })
}

fn request_config_handler<C, S>(registry: Arc<Registry<C, S>>) -> Handler
where
    C: Clock + 'static,
    S: ConfigSource + 'static,
{
    Arc::new(move |_msg: Message, _client: Arc<dyn BusClient>| -> HandlerFuture {
        let registry = registry.clone();
        Box::pin(async move {
            let mut extra = std::collections::HashMap::new();
            extra.insert("config".to_string(), registry.snapshot());
            HandlerReply::ok_with(extra).into_value()
        })
    })
}

fn request_icon_handler<C, S>(registry: Arc<Registry<C, S>>) -> Handler
where
    C: Clock + 'static,
    S: ConfigSource + 'static,
{
    Arc::new(move |_msg: Message, _client: Arc<dyn BusClient>| -> HandlerFuture {
        let registry = registry.clone();
        Box::pin(async move {
            let path = registry.logo_path();
            match std::fs::read(&path) {
                Ok(bytes) => {
                    let icon = base64::engine::general_purpose::STANDARD.encode(bytes);
                    let mut extra = std::collections::HashMap::new();
                    extra.insert("icon".to_string(), Value::String(icon));
                    HandlerReply::ok_with(extra).into_value()
                }
                Err(err) => {
                    warn!(%err, path = %path.display(), "request_icon: failed to read logo file");
                    HandlerReply::error(format!("failed to read {}: {err}", path.display())).into_value()
                }
            }
        })
    })
}

fn request_log_chunk_handler<C, S>(registry: Arc<Registry<C, S>>) -> Handler
where
    C: Clock + 'static,
    S: ConfigSource + 'static,
{
    Arc::new(move |msg: Message, _client: Arc<dyn BusClient>| -> HandlerFuture {
        let registry = registry.clone();
        Box::pin(async move {
            let job_name = msg.payload.get("job_name").and_then(Value::as_str).unwrap_or_default();
            let range = msg.payload.get("range").and_then(Value::as_str).unwrap_or_default();

            let uid = registry.uid();
            let dir = registry.job_logs_dir();
            let path = log_path_for(&dir, &uid, job_name, registry.clock().now());

            let chunk = match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    let filename = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
                    let prefixed = format!("{filename}\n-----\n{contents}");
                    slice_by_range(&prefixed, range)
                }
                Err(_) => format!("no log file found at {}", path.display()),
            };

            let mut extra = std::collections::HashMap::new();
            extra.insert("log".to_string(), Value::String(chunk));
            HandlerReply::ok_with(extra).into_value()
        })
    })
}

fn trigger_job_handler<C, S>(registry: Arc<Registry<C, S>>) -> Handler
where
    C: Clock + 'static,
    S: ConfigSource + 'static,
{
    Arc::new(move |msg: Message, client: Arc<dyn BusClient>| -> HandlerFuture {
        let registry = registry.clone();
        Box::pin(async move {
            let job_name = msg.payload.get("job_name").and_then(Value::as_str).unwrap_or_default();
            let reason = msg.payload.get("reason").and_then(Value::as_str).unwrap_or("triggered");
            match registry
                .change_job_state(job_name, JobState::Pending, reason, Some(client.as_ref()))
                .await
            {
                Ok(()) => HandlerReply::ok().into_value(),
                Err(err) => HandlerReply::error(err.to_string()).into_value(),
            }
        })
    })
}

fn change_job_state_handler<C, S>(registry: Arc<Registry<C, S>>) -> Handler
where
    C: Clock + 'static,
    S: ConfigSource + 'static,
{
    Arc::new(move |msg: Message, client: Arc<dyn BusClient>| -> HandlerFuture {
        let registry = registry.clone();
        Box::pin(async move {
            let job_name = msg.payload.get("job_name").and_then(Value::as_str).unwrap_or_default();
            let reason = msg.payload.get("reason").and_then(Value::as_str).unwrap_or("change_job_state");
            let new_state = match msg
                .payload
                .get("new_state")
                .and_then(Value::as_str)
                .map(str::parse::<JobState>)
            {
                Some(Ok(state)) => state,
                Some(Err(err)) => return HandlerReply::error(err.to_string()).into_value(),
                None => return HandlerReply::error("missing new_state").into_value(),
            };
            match registry
                .change_job_state(job_name, new_state, reason, Some(client.as_ref()))
                .await
            {
                Ok(()) => HandlerReply::ok().into_value(),
                Err(err) => HandlerReply::error(err.to_string()).into_value(),
            }
        })
    })
}

/// Slice `text` by `range` (`"a:b"`, `:N`, `N:`, or empty for the whole
/// text), indexed by character position (`spec.md` §4.5).
fn slice_by_range(text: &str, range: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if range.is_empty() {
        return text.to_string();
    }
    let (lo, hi) = range.split_once(':').unwrap_or((range, ""));
    let start = lo.parse::<usize>().unwrap_or(0).min(chars.len());
    let end = hi.parse::<usize>().unwrap_or(chars.len()).min(chars.len());
    if start >= end {
        return String::new();
    }
    chars[start..end].iter().collect()
}

/// Classification list and tag for the orchestrator's own directory entry
/// (`spec.md` §4.5: "registers the orchestrator on the bus under two
/// classifications: `FlowController` and its UID").
pub fn classifications_and_tag(uid: &str, title: &str) -> (Vec<String>, Value) {
    (vec!["FlowController".to_string(), uid.to_string()], json!({ "title": title }))
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
