// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Prints the hardware topology of the host (or of an hwloc XML export) as an indented text tree.

#![deny(clippy::pedantic, clippy::unwrap_used)]

mod args;

use std::io::{BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use hardware::discovery::list;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::args::CmdArgs;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = CmdArgs::parse();
    init_logging();
    debug!(?args, "starting");

    let mut discovery = args.discovery();
    let mut out = BufWriter::new(std::io::stdout().lock());
    if let Err(e) = list(&mut discovery, args.render_options(), &mut out) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = out.flush() {
        eprintln!("failed to write topology: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
