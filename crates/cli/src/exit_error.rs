// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, letting `main()` handle process termination in one place.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<crate::error::CliError> for ExitError {
    fn from(err: crate::error::CliError) -> Self {
        use crate::error::CliError;
        let code = match &err {
            CliError::Unreachable { .. } | CliError::Bus(_) | CliError::Daemon(_) => 2,
            CliError::Config(_) | CliError::Registry(_) => 1,
            CliError::UnknownAction(_) | CliError::MissingJobName { .. } | CliError::MissingNewState { .. } => 64,
            CliError::RemoteError(_) => 1,
        };
        Self::new(code, err.to_string())
    }
}

/// Extract the exit code `main` should use: an [`ExitError`] carries its own
/// code, anything else is exit code 1 with the error printed to stderr.
pub fn exit_code_for(err: &anyhow::Error) -> (i32, String) {
    match err.downcast_ref::<ExitError>() {
        Some(exit_err) => (exit_err.code, exit_err.message.clone()),
        None => (1, err.to_string()),
    }
}
