// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors
//
// # Hardware topology model and text rendering

//! The `hardware` crate models a discovered hardware topology (processors, caches, memory banks,
//! I/O buses, PCI devices) and renders it as a single indented text tree, the way
//! `lstopo-no-graphics` does.
//!
//! ## Overview
//!
//! - [`topology::Topology`] is an arena of [`Node`]s addressed by [`topology::NodeIndex`].  Every
//!   node has four ordered child sequences (normal, memory, I/O and misc), selected by the
//!   [`ObjectKind`] of the child.
//! - [`render::TreeView`] walks the arena depth first and prints one line per node, merging
//!   single-child chains that share the same [`cpuset::CpuSet`] onto one line.
//! - [`pci::class`] turns a 16-bit PCI class code into a short label such as `SATA` or `Display`.
//! - [`discovery`] is the boundary to the topology discovery library, with a scoped
//!   [`discovery::Session`] that always releases the discovered topology.
//!
//! ## Features
//!
//! - `scan`: Enables hardware topology scanning using the `hwlocality` crate.

#![deny(clippy::pedantic, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::num::NonZero;

use crate::cpuset::CpuSet;
use crate::group::GroupAttributes;
use crate::mem::cache::CacheAttributes;
use crate::mem::numa::NumaNodeAttributes;
use crate::os::OsDeviceAttributes;
use crate::pci::PciDeviceAttributes;
use crate::pci::bridge::BridgeAttributes;
use crate::topology::Collection;

pub mod cpuset;
pub mod discovery;
pub mod group;
pub mod mem;
pub mod os;
pub mod pci;
pub mod render;
pub mod topology;

#[cfg(feature = "scan")]
pub mod scan;

/// A non-zero byte count used throughout the crate for memory sizes.
pub type ByteCount = NonZero<u64>;

/// The kind of a topology object.
///
/// The `Display` form is the short hwloc type name.  The label printed in a tree may be more
/// specific (`L1dCache`, `PCIBridge`, `Block`); see [`render::label`].
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    strum::Display,
    strum::EnumIs,
    strum::EnumIter,
)]
pub enum ObjectKind {
    Machine,
    Package,
    Die,
    Core,
    #[strum(serialize = "PU")]
    Pu,
    L1Cache,
    L2Cache,
    L3Cache,
    L4Cache,
    L5Cache,
    L1ICache,
    L2ICache,
    L3ICache,
    Group,
    #[strum(serialize = "NUMANode")]
    NumaNode,
    MemCache,
    Bridge,
    #[strum(serialize = "PCIDev")]
    PciDevice,
    #[strum(serialize = "OSDev")]
    OsDevice,
    Misc,
}

impl ObjectKind {
    /// The child sequence of its parent an object of this kind lives in.
    #[must_use]
    pub fn collection(self) -> Collection {
        match self {
            ObjectKind::NumaNode | ObjectKind::MemCache => Collection::Memory,
            ObjectKind::Bridge | ObjectKind::PciDevice | ObjectKind::OsDevice => Collection::Io,
            ObjectKind::Misc => Collection::Misc,
            _ => Collection::Normal,
        }
    }

    /// Returns the cache level for CPU cache kinds.
    #[must_use]
    pub fn cache_level(self) -> Option<u8> {
        match self {
            ObjectKind::L1Cache | ObjectKind::L1ICache => Some(1),
            ObjectKind::L2Cache | ObjectKind::L2ICache => Some(2),
            ObjectKind::L3Cache | ObjectKind::L3ICache => Some(3),
            ObjectKind::L4Cache => Some(4),
            ObjectKind::L5Cache => Some(5),
            _ => None,
        }
    }

    /// True for the instruction-only cache kinds.
    #[must_use]
    pub fn is_instruction_cache(self) -> bool {
        matches!(
            self,
            ObjectKind::L1ICache | ObjectKind::L2ICache | ObjectKind::L3ICache
        )
    }
}

/// Kind specific attributes of a [`Node`].
///
/// Only the kinds listed here carry attributes; the label formatter reads them to print sizes, bus
/// addresses and class names.
///
/// ```
/// # use topo_hardware::NodeAttributes;
/// # use topo_hardware::mem::numa::NumaNodeAttributes;
/// #
/// let numa = NodeAttributes::NumaNode(NumaNodeAttributes::new(None));
/// assert!(numa.is_numa_node());
/// assert_eq!(numa.to_string(), "NumaNode");
/// ```
#[derive(Clone, Debug, PartialEq, strum::Display, strum::EnumIs)]
pub enum NodeAttributes {
    /// Attributes for a NUMA (Non-Uniform Memory Access) node.
    NumaNode(NumaNodeAttributes),
    /// Attributes for a CPU cache (L1, L2, L3, etc.).
    Cache(CacheAttributes),
    /// Attributes for a PCI device.
    Pci(PciDeviceAttributes),
    /// Attributes for a PCI bridge.
    Bridge(BridgeAttributes),
    /// Attributes for a logical hardware group.
    Group(GroupAttributes),
    /// Attributes for an operating system device.
    OsDevice(OsDeviceAttributes),
}

/// A node in the hardware topology.
///
/// A `Node` only carries what was discovered about one object.  Its position in the tree
/// (depth, parent, children) is owned by the [`topology::Topology`] it is attached to.
///
/// # Examples
///
/// ```
/// # use topo_hardware::{Node, ObjectKind};
/// #
/// let core = Node::new(ObjectKind::Core, 3)
///     .with_os_index(3)
///     .with_cpuset("6-7".parse().unwrap());
/// assert_eq!(core.logical_index(), 3);
/// assert!(core.cpuset().is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    kind: ObjectKind,
    logical_index: usize,
    subtype: Option<String>,
    os_index: Option<usize>,
    name: Option<String>,
    cpuset: Option<CpuSet>,
    total_memory: Option<ByteCount>,
    properties: BTreeMap<String, String>,
    attributes: Option<NodeAttributes>,
}

impl Node {
    /// Creates a node of the given kind with no optional data.
    #[must_use]
    pub fn new(kind: ObjectKind, logical_index: usize) -> Self {
        Self {
            kind,
            logical_index,
            subtype: None,
            os_index: None,
            name: None,
            cpuset: None,
            total_memory: None,
            properties: BTreeMap::new(),
            attributes: None,
        }
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    #[must_use]
    pub fn with_os_index(mut self, os_index: usize) -> Self {
        self.os_index = Some(os_index);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_cpuset(mut self, cpuset: CpuSet) -> Self {
        self.cpuset = Some(cpuset);
        self
    }

    /// Sets the total memory below this node.  Only the root may carry it.
    #[must_use]
    pub fn with_total_memory(mut self, bytes: ByteCount) -> Self {
        self.total_memory = Some(bytes);
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: NodeAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Returns the kind of this node.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Returns the index of this node among the nodes of the same kind at the same depth.
    #[must_use]
    pub fn logical_index(&self) -> usize {
        self.logical_index
    }

    /// Returns the optional subtype providing more specific categorization (e.g. `"Disk"`).
    #[must_use]
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// Returns the OS-assigned index for this node, if available.
    ///
    /// This is typically used for components that have OS-visible indices,
    /// such as processing units or NUMA nodes.
    #[must_use]
    pub fn os_index(&self) -> Option<usize> {
        self.os_index
    }

    /// Returns the human-readable name of this node, if available.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the set of processing units below this node, if known.
    #[must_use]
    pub fn cpuset(&self) -> Option<&CpuSet> {
        self.cpuset.as_ref()
    }

    /// Returns the total memory below this node.  Only ever set on the root.
    #[must_use]
    pub fn total_memory(&self) -> Option<ByteCount> {
        self.total_memory
    }

    /// Returns the key-value properties associated with this node.
    ///
    /// Properties provide additional metadata that doesn't fit into the
    /// structured attributes, such as vendor names.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Returns the specific attributes for this node type, if available.
    #[must_use]
    pub fn attributes(&self) -> Option<&NodeAttributes> {
        self.attributes.as_ref()
    }
}
