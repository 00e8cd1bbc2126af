// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

use clap::Parser;
use flowctl_bus::LocalBus;
use flowctl_cli::exit_error::exit_code_for;
use flowctl_cli::Cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let bus = LocalBus::new();

    if let Err(err) = flowctl_cli::run(cli, &bus).await {
        let (code, message) = exit_code_for(&err);
        eprintln!("flowctl: {message}");
        std::process::exit(code);
    }
}
