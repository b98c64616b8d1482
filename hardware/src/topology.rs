// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The topology tree.
//!
//! A [`Topology`] owns every [`Node`] in a single arena.  Nodes refer to their parent and
//! children by [`NodeIndex`], so there are no back-pointers to own.  Each node has four ordered
//! child sequences, one per [`Collection`]; which one a child lands in is decided by its
//! [`ObjectKind`].
//!
//! ```
//! use topo_hardware::topology::{Collection, Topology};
//! use topo_hardware::{Node, ObjectKind};
//!
//! let mut topology = Topology::new(Node::new(ObjectKind::Machine, 0)).unwrap();
//! let package = topology
//!     .attach(topology.root().index(), Node::new(ObjectKind::Package, 0))
//!     .unwrap();
//! let numa = topology
//!     .attach(package, Node::new(ObjectKind::NumaNode, 0))
//!     .unwrap();
//!
//! let package = topology.get(package).unwrap();
//! assert_eq!(package.depth(), 1);
//! assert_eq!(package.arity(Collection::Normal), 0);
//! assert_eq!(package.arity(Collection::Memory), 1);
//! assert_eq!(topology.get(numa).unwrap().parent().unwrap().index(), package.index());
//! ```

use std::fmt::{Display, Formatter};

use crate::{Node, NodeAttributes, ObjectKind};

/// Stable address of a node inside its [`Topology`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct NodeIndex(usize);

impl Display for NodeIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four child sequences of a node.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display, strum::EnumIter)]
pub enum Collection {
    /// CPU side objects: packages, cores, caches, processing units, groups.
    Normal,
    /// Memory objects: NUMA nodes and memory-side caches.
    Memory,
    /// I/O objects: bridges, PCI devices, OS devices.
    Io,
    /// Objects outside the hardware hierarchy.
    Misc,
}

/// Errors which may occur while building a [`Topology`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("no node {0} in this topology")]
    UnknownParent(NodeIndex),
    #[error("{0} node has no PCI attributes")]
    MissingPciAttributes(ObjectKind),
    #[error("{0} node carries PCI attributes")]
    UnexpectedPciAttributes(ObjectKind),
    #[error("only the root may carry total memory, not a {0} node")]
    TotalMemoryBelowRoot(ObjectKind),
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Children {
    normal: Vec<NodeIndex>,
    memory: Vec<NodeIndex>,
    io: Vec<NodeIndex>,
    misc: Vec<NodeIndex>,
}

impl Children {
    fn get(&self, collection: Collection) -> &[NodeIndex] {
        match collection {
            Collection::Normal => &self.normal,
            Collection::Memory => &self.memory,
            Collection::Io => &self.io,
            Collection::Misc => &self.misc,
        }
    }

    fn get_mut(&mut self, collection: Collection) -> &mut Vec<NodeIndex> {
        match collection {
            Collection::Normal => &mut self.normal,
            Collection::Memory => &mut self.memory,
            Collection::Io => &mut self.io,
            Collection::Misc => &mut self.misc,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    node: Node,
    depth: usize,
    parent: Option<NodeIndex>,
    children: Children,
}

/// An arena holding a whole topology tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Topology {
    entries: Vec<Entry>,
}

fn check_pci_attributes(node: &Node) -> Result<(), TopologyError> {
    let has_pci = matches!(node.attributes(), Some(NodeAttributes::Pci(_)));
    match (node.kind(), has_pci) {
        (ObjectKind::PciDevice, false) => {
            Err(TopologyError::MissingPciAttributes(ObjectKind::PciDevice))
        }
        (kind, true) if kind != ObjectKind::PciDevice => {
            Err(TopologyError::UnexpectedPciAttributes(kind))
        }
        _ => Ok(()),
    }
}

impl Topology {
    /// Creates a topology made of a single root node.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is a PCI device without PCI attributes, or carries PCI
    /// attributes without being a PCI device.
    pub fn new(root: Node) -> Result<Self, TopologyError> {
        check_pci_attributes(&root)?;
        Ok(Self {
            entries: vec![Entry {
                node: root,
                depth: 0,
                parent: None,
                children: Children::default(),
            }],
        })
    }

    /// Appends `node` as the last child of `parent`, in the collection its kind belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is not in this topology, if the node's PCI attributes do not
    /// match its kind, or if the node carries total memory.
    pub fn attach(&mut self, parent: NodeIndex, node: Node) -> Result<NodeIndex, TopologyError> {
        check_pci_attributes(&node)?;
        if node.total_memory().is_some() {
            return Err(TopologyError::TotalMemoryBelowRoot(node.kind()));
        }
        let index = NodeIndex(self.entries.len());
        let collection = node.kind().collection();
        let parent_entry = self
            .entries
            .get_mut(parent.0)
            .ok_or(TopologyError::UnknownParent(parent))?;
        parent_entry.children.get_mut(collection).push(index);
        let depth = parent_entry.depth + 1;
        self.entries.push(Entry {
            node,
            depth,
            parent: Some(parent),
            children: Children::default(),
        });
        Ok(index)
    }

    /// The root of the tree.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            topology: self,
            index: NodeIndex(0),
        }
    }

    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<NodeRef<'_>> {
        (index.0 < self.entries.len()).then_some(NodeRef {
            topology: self,
            index,
        })
    }

    /// Number of nodes in the tree, root included.
    #[must_use]
    #[allow(clippy::len_without_is_empty)] // never empty: the root is always there
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry(&self, index: NodeIndex) -> &Entry {
        &self.entries[index.0]
    }
}

/// A borrowed view of one node and its position in the tree.
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'t> {
    topology: &'t Topology,
    index: NodeIndex,
}

impl<'t> NodeRef<'t> {
    #[must_use]
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// The discovered data for this node.
    #[must_use]
    pub fn node(&self) -> &'t Node {
        &self.topology.entry(self.index).node
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.node().kind()
    }

    /// Distance from the root; the root is at depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.topology.entry(self.index).depth
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.topology.entry(self.index).parent.is_none()
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.topology
            .entry(self.index)
            .parent
            .map(|index| NodeRef {
                topology: self.topology,
                index,
            })
    }

    /// Number of children in one collection.
    #[must_use]
    pub fn arity(&self, collection: Collection) -> usize {
        self.topology
            .entry(self.index)
            .children
            .get(collection)
            .len()
    }

    /// The children in one collection, in order.
    pub fn children(&self, collection: Collection) -> impl Iterator<Item = NodeRef<'t>> + use<'t> {
        let topology = self.topology;
        topology
            .entry(self.index)
            .children
            .get(collection)
            .iter()
            .map(move |&index| NodeRef { topology, index })
    }
}
