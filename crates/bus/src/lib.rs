// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flowctl-bus: the pub/sub client abstraction the core consumes
//! (`spec.md` §3, §9) plus an in-process reference implementation.
//!
//! The bus *transport* is explicitly out of scope (`spec.md` §3's first
//! Non-goal) — this crate defines the shape, not a wire protocol.

mod client;
mod error;
mod local;
mod message;

pub use client::{ping, BusClient, ConstructMsg, Handler, HandlerFuture, DEFAULT_REQUEST_TIMEOUT};
pub use error::BusError;
pub use local::{LocalBus, LocalBusClient};
pub use message::{HandlerReply, Message, MessageKind, ParseMessageKindError, PeerInfo, BROADCAST};
