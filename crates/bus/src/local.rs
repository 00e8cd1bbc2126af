// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! In-process `BusClient` reference implementation. Used by the test
//! suites of every downstream crate and, per `SPEC_FULL.md` §2, available
//! as a real same-process transport when daemon and CLI share one binary.

use crate::client::{BusClient, Handler, HandlerFuture};
use crate::error::BusError;
use crate::message::{Message, MessageKind, PeerInfo, BROADCAST};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

struct PeerState {
    info: PeerInfo,
    handlers: HashMap<MessageKind, Handler>,
}

/// The shared registry a `LocalBus` wraps. Cloning a `LocalBus` clones the
/// `Arc`, so every client constructed from the same bus sees the same
/// directory and can reach every other client's handlers.
#[derive(Clone, Default)]
pub struct LocalBus {
    peers: Arc<Mutex<HashMap<String, PeerState>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client bound to `client_id` on this bus. `start` must be
    /// called before the client is discoverable or can receive requests.
    pub fn client(&self, client_id: impl Into<String>) -> Arc<LocalBusClient> {
        Arc::new(LocalBusClient {
            bus: self.clone(),
            client_id: client_id.into(),
        })
    }
}

pub struct LocalBusClient {
    bus: LocalBus,
    client_id: String,
}

#[async_trait]
impl BusClient for LocalBusClient {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    async fn start(&self, classifications: Vec<String>, tag: Value) -> Result<(), BusError> {
        let mut peers = self.bus.peers.lock();
        if peers.contains_key(&self.client_id) {
            return Err(BusError::AlreadyRegistered(self.client_id.clone()));
        }
        peers.insert(
            self.client_id.clone(),
            PeerState {
                info: PeerInfo { classifications, tag },
                handlers: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn stop(&self) -> Result<(), BusError> {
        self.bus.peers.lock().remove(&self.client_id);
        Ok(())
    }

    async fn send_message(&self, msg: Message) -> Result<(), BusError> {
        let kind = msg
            .kind()
            .map_err(|_| BusError::NoHandler { target: msg.target.clone(), kind: msg.kind.clone() })?;

        let handlers: Vec<(String, Handler)> = {
            let peers = self.bus.peers.lock();
            if msg.target == BROADCAST {
                peers
                    .iter()
                    .filter(|(id, _)| **id != self.client_id)
                    .filter_map(|(id, peer)| peer.handlers.get(&kind).map(|h| (id.clone(), h.clone())))
                    .collect()
            } else {
                match peers.get(&msg.target).and_then(|peer| peer.handlers.get(&kind)) {
                    Some(handler) => vec![(msg.target.clone(), handler.clone())],
                    None => Vec::new(),
                }
            }
        };

        for (_id, handler) in handlers {
            // Fire-and-forget: broadcast/publish never waits on a reply.
            let fut = handler(msg.clone(), self.self_handle_dyn());
            tokio::spawn(fut);
        }
        Ok(())
    }

    async fn send_request(&self, msg: Message, timeout: Duration) -> Result<Value, BusError> {
        let kind = msg
            .kind()
            .map_err(|_| BusError::NoHandler { target: msg.target.clone(), kind: msg.kind.clone() })?;

        let handler = {
            let peers = self.bus.peers.lock();
            let peer = peers
                .get(&msg.target)
                .ok_or_else(|| BusError::UnknownPeer(msg.target.clone()))?;
            peer.handlers
                .get(&kind)
                .cloned()
                .ok_or_else(|| BusError::NoHandler { target: msg.target.clone(), kind: msg.kind.clone() })?
        };

        let target = msg.target.clone();
        let kind_str = msg.kind.clone();
        let fut = handler(msg, self.self_handle_dyn());
        tokio::time::timeout(timeout, fut)
            .await
            .map_err(|_| BusError::Timeout { target, kind: kind_str })
    }

    fn add_message_handler(&self, kind: MessageKind, handler: Handler) {
        let mut peers = self.bus.peers.lock();
        if let Some(peer) = peers.get_mut(&self.client_id) {
            peer.handlers.insert(kind, handler);
        }
    }

    async fn get_info_for_all_clients(&self) -> Result<HashMap<String, PeerInfo>, BusError> {
        Ok(self
            .bus
            .peers
            .lock()
            .iter()
            .map(|(id, peer)| (id.clone(), peer.info.clone()))
            .collect())
    }

    async fn is_alive(&self, client_name: &str) -> Result<bool, BusError> {
        Ok(self.bus.peers.lock().contains_key(client_name))
    }
}

impl LocalBusClient {
    fn self_handle_dyn(&self) -> Arc<dyn BusClient> {
        // Handlers need an `Arc<dyn BusClient>` back-reference; since
        // `LocalBusClient` itself is always held behind `Arc` (constructed
        // only via `LocalBus::client`), a fresh lightweight handle bound to
        // the same bus is equivalent and avoids threading `Arc<Self>`
        // through every trait method.
        self.bus.client(self.client_id.clone())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
