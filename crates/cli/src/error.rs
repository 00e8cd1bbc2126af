// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Errors raised while loading configuration or talking to the bus on
//! behalf of a CLI flag. `main` converts these into an [`crate::exit_error::ExitError`]
//! with the exit codes described in `spec.md` §6, §7.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] flowctl_core::ConfigError),

    #[error(transparent)]
    Registry(#[from] flowctl_engine::RegistryError),

    #[error(transparent)]
    Bus(#[from] flowctl_bus::BusError),

    #[error(transparent)]
    Daemon(#[from] flowctl_daemon::DaemonError),

    #[error("no orchestrator with uid '{uid}' is responding on the bus")]
    Unreachable { uid: String },

    #[error("unknown --action '{0}'")]
    UnknownAction(String),

    #[error("--action {action} requires --job_name")]
    MissingJobName { action: String },

    #[error("--action {action} requires --new_state")]
    MissingNewState { action: String },

    #[error("orchestrator returned an error: {0}")]
    RemoteError(String),
}
