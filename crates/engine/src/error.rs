// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Config(#[from] flowctl_core::ConfigError),

    #[error(transparent)]
    Ledger(#[from] flowctl_ledger::LedgerError),

    #[error("unknown job '{0}'")]
    UnknownJob(String),

    #[error("unrecognized job state '{0}'")]
    BadState(#[from] flowctl_core::ParseJobStateError),
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to open log file {path}: {source}")]
    OpenLog {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn '{cmd}': {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },
}
