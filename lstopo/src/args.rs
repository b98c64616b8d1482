// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use hardware::render::RenderOptions;
use hardware::scan::HwlocDiscovery;

#[derive(Debug, Parser)]
#[command(name = "lstopo")]
#[command(about = "Show the hardware topology of this machine as a text tree", long_about = None)]
pub struct CmdArgs {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Read the topology from an hwloc XML export instead of discovering the host"
    )]
    input: Option<PathBuf>,

    #[arg(short, long, help = "Show physical (OS) indexes as P#N")]
    physical: bool,

    #[arg(
        short,
        long,
        help = "Show detailed object attributes and memory sizes in KB"
    )]
    verbose: bool,
}

impl CmdArgs {
    #[must_use]
    pub fn discovery(&self) -> HwlocDiscovery {
        match &self.input {
            Some(path) => HwlocDiscovery::from_xml(path),
            None => HwlocDiscovery::host(),
        }
    }

    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            verbose: self.verbose,
            physical: self.physical,
        }
    }
}
