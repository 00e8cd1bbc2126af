// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flowctl-daemon: the Bus Adapter and Daemon Shell that wire the Job
//! Registry, Scheduler Loop, and Process Runner onto a message bus
//! (`spec.md` §4.5, §4.6).

pub mod adapter;
pub mod error;
pub mod shell;

pub use adapter::{classifications_and_tag, INBOUND_KINDS, OUTBOUND_KINDS};
pub use error::DaemonError;
