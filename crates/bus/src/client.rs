// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! The `BusClient` trait: the external pub/sub collaborator the core
//! consumes (`spec.md` §3, §9 "Message bus"). The bus transport itself is
//! out of scope; this trait is the shape the rest of the workspace codes
//! against, with [`crate::LocalBus`] as the reference/test implementation.

use crate::error::BusError;
use crate::message::{Message, MessageKind, PeerInfo};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Default bus request/response timeout (`spec.md` §5: "Timeouts apply
/// only to bus request/response (5 s)").
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub type HandlerFuture = Pin<Box<dyn Future<Output = Value> + Send>>;

/// `handler(msg, client) -> result_payload`, per `spec.md` §9.
pub type Handler = Arc<dyn Fn(Message, Arc<dyn BusClient>) -> HandlerFuture + Send + Sync>;

#[async_trait]
pub trait BusClient: Send + Sync {
    /// This client's own peer name (its UID on the bus, or a generated
    /// name for a short-lived "terminal" client).
    fn client_id(&self) -> &str;

    /// Register this client's directory entry: classifications (e.g.
    /// `["FlowController", uid]`) and an opaque tag (e.g. `{title}`).
    async fn start(&self, classifications: Vec<String>, tag: Value) -> Result<(), BusError>;

    async fn stop(&self) -> Result<(), BusError>;

    /// Fire-and-forget publish. `target` may be [`crate::message::BROADCAST`]
    /// or a specific peer name.
    async fn send_message(&self, msg: Message) -> Result<(), BusError>;

    /// Send a direct request and wait for the target's handler reply,
    /// bounded by `timeout`.
    async fn send_request(&self, msg: Message, timeout: Duration) -> Result<Value, BusError>;

    /// Register a handler for inbound messages of `kind` addressed to this
    /// client.
    fn add_message_handler(&self, kind: MessageKind, handler: Handler);

    async fn get_info_for_all_clients(&self) -> Result<HashMap<String, PeerInfo>, BusError>;

    async fn is_alive(&self, client_name: &str) -> Result<bool, BusError>;
}

/// Convenience for callers that only need success/failure, matching the
/// ping probe used by the Daemon Shell's uniqueness check (`spec.md` §4.6).
pub async fn ping(client: &dyn BusClient, target: &str) -> Result<bool, BusError> {
    let msg = client.construct_msg(MessageKind::Ping, target, Value::Null);
    match client.send_request(msg, DEFAULT_REQUEST_TIMEOUT).await {
        Ok(_) => Ok(true),
        Err(BusError::Timeout { .. }) | Err(BusError::UnknownPeer(_)) => Ok(false),
        Err(other) => Err(other),
    }
}

/// `construct_msg` as a free helper so every client shares the same
/// envelope shape without re-implementing source tagging.
pub trait ConstructMsg {
    fn construct_msg(&self, kind: MessageKind, target: &str, payload: Value) -> Message;
}

impl<T: BusClient + ?Sized> ConstructMsg for T {
    fn construct_msg(&self, kind: MessageKind, target: &str, payload: Value) -> Message {
        Message::new(kind, self.client_id(), target, payload)
    }
}
