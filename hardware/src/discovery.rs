// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Boundary with the topology discovery library.
//!
//! Discovery is a fixed sequence of steps (init, filters, flags, load).  Whatever step fails,
//! the partially built topology must be released exactly once.  [`Session`] ties that release to
//! scope, and [`list`] runs the whole sequence and prints the tree.

use std::io::Write;

use tracing::{debug, info};

use crate::render::{RenderOptions, TreeView};
use crate::topology::Topology;

/// The steps of a discovery run, named after the discovery library calls.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display, strum::EnumIter)]
pub enum Step {
    #[strum(serialize = "hwloc_topology_init")]
    Init,
    #[strum(serialize = "hwloc_topology_set_types_filter")]
    Filters,
    #[strum(serialize = "hwloc_topology_set_flags")]
    Flags,
    #[strum(serialize = "hwloc_topology_load")]
    Load,
}

/// Errors reported by the discovery library.  All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The topology could not be allocated or initialized.
    #[error("{} failed: {reason}", Step::Init)]
    Init { reason: String },
    /// A filter or flag was rejected.
    #[error("{step} failed: {reason}")]
    Config { step: Step, reason: String },
    /// Discovery itself failed (permissions, unsupported platform, bad input file, ...).
    #[error("{} failed: {reason}", Step::Load)]
    Load { reason: String },
}

impl DiscoveryError {
    /// The step that failed.
    #[must_use]
    pub fn step(&self) -> Step {
        match self {
            DiscoveryError::Init { .. } => Step::Init,
            DiscoveryError::Config { step, .. } => *step,
            DiscoveryError::Load { .. } => Step::Load,
        }
    }
}

/// A topology discovery library.
///
/// Implementations keep the library handle internally.  The steps are called in order, at most
/// once each; [`Discovery::destroy`] may be called at any point and must be idempotent.
pub trait Discovery {
    /// Allocates and initializes the topology handle.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::Init`] if the handle could not be created.
    fn init(&mut self) -> Result<(), DiscoveryError>;

    /// Keeps every object type, and only the important I/O object types.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::Config`] if the library rejects a filter.
    fn configure_filters(&mut self) -> Result<(), DiscoveryError>;

    /// Sets the build flags (import support).
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::Config`] if the library rejects the flags.
    fn set_flags(&mut self) -> Result<(), DiscoveryError>;

    /// Discovers the topology and returns a snapshot of the whole tree, rooted at the root object.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::Load`] if discovery fails.
    fn load(&mut self) -> Result<Topology, DiscoveryError>;

    /// Releases the library handle, if any.
    fn destroy(&mut self);
}

/// Scoped use of a [`Discovery`]: the topology is destroyed when the session is dropped.
pub struct Session<'d, D: Discovery + ?Sized> {
    discovery: &'d mut D,
}

impl<'d, D: Discovery + ?Sized> Session<'d, D> {
    #[must_use]
    pub fn new(discovery: &'d mut D) -> Self {
        Self { discovery }
    }

    /// Runs init, filters, flags and load, in that order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step which fails.
    pub fn load(&mut self) -> Result<Topology, DiscoveryError> {
        debug!("initializing topology");
        self.discovery.init()?;
        debug!("configuring type filters");
        self.discovery.configure_filters()?;
        debug!("setting topology flags");
        self.discovery.set_flags()?;
        debug!("loading topology");
        let topology = self.discovery.load()?;
        info!(nodes = topology.len(), "topology loaded");
        Ok(topology)
    }
}

impl<D: Discovery + ?Sized> Drop for Session<'_, D> {
    fn drop(&mut self) {
        debug!("destroying topology");
        self.discovery.destroy();
    }
}

/// Errors which may occur while listing a topology.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("failed to write topology: {0}")]
    Output(#[from] std::io::Error),
}

/// Discovers the topology and writes it to `out` as a text tree followed by a newline.
///
/// Nothing is written unless discovery succeeds.  The discovered topology is destroyed exactly
/// once before this returns, on every path.
///
/// # Errors
///
/// Returns [`ListError::Discovery`] if any discovery step fails and [`ListError::Output`] if
/// writing to `out` fails.
pub fn list<D, W>(discovery: &mut D, options: RenderOptions, out: &mut W) -> Result<(), ListError>
where
    D: Discovery + ?Sized,
    W: Write + ?Sized,
{
    let mut session = Session::new(discovery);
    let topology = session.load()?;
    writeln!(out, "{}", TreeView::new(&topology, options))?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Node, ObjectKind};
    use strum::IntoEnumIterator;

    /// Fails at one step and counts teardowns.
    struct FailAt {
        step: Step,
        destroyed: usize,
    }

    impl FailAt {
        fn check(&self, step: Step) -> Result<(), DiscoveryError> {
            if self.step != step {
                return Ok(());
            }
            let reason = "Permission denied (os error 13)".to_string();
            Err(match step {
                Step::Init => DiscoveryError::Init { reason },
                Step::Filters | Step::Flags => DiscoveryError::Config { step, reason },
                Step::Load => DiscoveryError::Load { reason },
            })
        }
    }

    impl Discovery for FailAt {
        fn init(&mut self) -> Result<(), DiscoveryError> {
            self.check(Step::Init)
        }
        fn configure_filters(&mut self) -> Result<(), DiscoveryError> {
            self.check(Step::Filters)
        }
        fn set_flags(&mut self) -> Result<(), DiscoveryError> {
            self.check(Step::Flags)
        }
        fn load(&mut self) -> Result<Topology, DiscoveryError> {
            self.check(Step::Load)?;
            Ok(Topology::new(Node::new(ObjectKind::Machine, 0)).unwrap())
        }
        fn destroy(&mut self) {
            self.destroyed += 1;
        }
    }

    #[test]
    fn every_failure_is_torn_down_once() {
        for step in Step::iter() {
            let mut discovery = FailAt { step, destroyed: 0 };
            let mut out = Vec::new();
            let err = list(&mut discovery, RenderOptions::default(), &mut out).unwrap_err();
            match err {
                ListError::Discovery(err) => assert_eq!(err.step(), step),
                ListError::Output(err) => panic!("unexpected output error {err}"),
            }
            assert_eq!(discovery.destroyed, 1, "{step}");
            assert!(out.is_empty(), "{step}");
        }
    }

    #[test]
    fn diagnostics_name_the_step() {
        let mut discovery = FailAt {
            step: Step::Flags,
            destroyed: 0,
        };
        let err = Session::new(&mut discovery).load().unwrap_err();
        assert_eq!(
            err.to_string(),
            "hwloc_topology_set_flags failed: Permission denied (os error 13)"
        );
        let err = DiscoveryError::Init {
            reason: "Cannot allocate memory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "hwloc_topology_init failed: Cannot allocate memory"
        );
    }
}
