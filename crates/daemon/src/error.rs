// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error(transparent)]
    Registry(#[from] flowctl_engine::RegistryError),

    #[error(transparent)]
    Bus(#[from] flowctl_bus::BusError),

    #[error("a '{uid}' orchestrator is already running on this bus")]
    AlreadyRunning { uid: String },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
