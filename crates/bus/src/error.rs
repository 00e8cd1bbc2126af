// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("bus request to '{target}' for kind '{kind}' timed out")]
    Timeout { target: String, kind: String },

    #[error("no peer registered as '{0}'")]
    UnknownPeer(String),

    #[error("peer '{target}' has no handler for message kind '{kind}'")]
    NoHandler { target: String, kind: String },

    #[error("bus client '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("bus client is not started")]
    NotStarted,
}
