// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to open ledger file {path}: {source}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write ledger file {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read ledger file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
