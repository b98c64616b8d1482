// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Text rendering of a topology tree.
//!
//! Every node is printed on its own line, indented by two spaces per level, unless it is the only
//! child of its parent and covers the same processing units: such chains are collapsed onto one
//! line joined by `" + "`.
//!
//! ```text
//! Machine (16GB total)
//!   Package L#0
//!     NUMANode L#0 (16GB)
//!     L3Cache L#0 (12MB)
//!       L2Cache L#0 (1280KB) + L1dCache L#0 (48KB) + Core L#0 + PU L#0
//!       L2Cache L#1 (1280KB) + L1dCache L#1 (48KB) + Core L#1 + PU L#1
//!   HostBridge
//!     PCI 00:02.0 (VGA)
//! ```
//!
//! Processing units never get a line of their own; they only show up merged into their parent.

pub mod label;

use std::fmt::{Display, Formatter, Write};

use crate::render::label::Label;
use crate::topology::{Collection, NodeRef, Topology};

/// Children are visited in this order for every node.
pub const VISIT_ORDER: [Collection; 4] = [
    Collection::Memory,
    Collection::Normal,
    Collection::Io,
    Collection::Misc,
];

const SEPARATOR: &str = " + ";

/// Knobs for the rendered text.  The default is the plain `lstopo` text output.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct RenderOptions {
    /// Show detailed attributes and memory sizes in KB.
    pub verbose: bool,
    /// Show `P#` OS indexes.
    pub physical: bool,
}

/// True if `node` is printed on the same line as `parent`.
///
/// That is the case when `node` is the only child of `parent` (in any collection) and both have
/// the same, known, set of processing units.
#[must_use]
pub fn merges_into(node: NodeRef<'_>, parent: NodeRef<'_>) -> bool {
    parent.arity(Collection::Normal) == 1
        && parent.arity(Collection::Memory) == 0
        && parent.arity(Collection::Io) == 0
        && parent.arity(Collection::Misc) == 0
        && matches!(
            (node.node().cpuset(), parent.node().cpuset()),
            (Some(child), Some(parent)) if child == parent
        )
}

/// A [`Topology`] rendered as an indented text tree.
///
/// The output has no trailing newline.
#[derive(Clone, Copy, Debug)]
pub struct TreeView<'t> {
    topology: &'t Topology,
    options: RenderOptions,
}

impl<'t> TreeView<'t> {
    #[must_use]
    pub fn new(topology: &'t Topology, options: RenderOptions) -> Self {
        Self { topology, options }
    }

    fn render(
        &self,
        f: &mut Formatter<'_>,
        node: NodeRef<'t>,
        parent: Option<NodeRef<'t>>,
        mut depth: usize,
    ) -> std::fmt::Result {
        if parent.is_some_and(|parent| merges_into(node, parent)) {
            f.write_str(SEPARATOR)?;
        } else {
            if parent.is_some() {
                f.write_char('\n')?;
            }
            write!(f, "{:indent$}", "", indent = 2 * depth)?;
            depth += 1;
        }
        write!(f, "{}", Label::new(node, self.options))?;

        for collection in VISIT_ORDER {
            for child in node.children(collection) {
                if child.kind().is_pu()
                    && matches!(collection, Collection::Memory | Collection::Normal)
                    && !merges_into(child, node)
                {
                    continue;
                }
                self.render(f, child, Some(node), depth)?;
            }
        }
        Ok(())
    }
}

impl Display for TreeView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.render(f, self.topology.root(), None, 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cpuset::CpuSet;
    use crate::mem::cache::{CacheAttributes, CacheType};
    use crate::mem::numa::NumaNodeAttributes;
    use crate::os::{OsDeviceAttributes, OsDeviceType};
    use crate::pci::bridge::{BridgeAttributes, BridgeType, DownstreamBuses};
    use crate::pci::class::ClassId;
    use crate::pci::{BusLocation, PciDeviceAttributes};
    use crate::topology::NodeIndex;
    use crate::{ByteCount, Node, NodeAttributes, ObjectKind};
    use pretty_assertions::assert_eq;

    fn cpus(list: &str) -> CpuSet {
        list.parse().unwrap()
    }

    fn machine(cpuset: &str) -> Topology {
        Topology::new(
            Node::new(ObjectKind::Machine, 0)
                .with_cpuset(cpus(cpuset))
                .with_total_memory(ByteCount::new(16 << 30).unwrap()),
        )
        .unwrap()
    }

    fn add(topology: &mut Topology, parent: NodeIndex, node: Node) -> NodeIndex {
        topology.attach(parent, node).unwrap()
    }

    fn render(topology: &Topology) -> String {
        TreeView::new(topology, RenderOptions::default()).to_string()
    }

    /// A single-child chain `Machine -> kinds...` sharing cpuset `0`.
    fn chain(kinds: &[ObjectKind]) -> Topology {
        let mut topology = machine("0");
        let mut parent = topology.root().index();
        for &kind in kinds {
            parent = add(&mut topology, parent, Node::new(kind, 0).with_cpuset(cpus("0")));
        }
        topology
    }

    #[test]
    fn single_child_chain_is_one_line() {
        let topology = chain(&[ObjectKind::Package, ObjectKind::Core, ObjectKind::Pu]);
        assert_eq!(
            render(&topology),
            "Machine (16GB total) + Package L#0 + Core L#0 + PU L#0"
        );
    }

    #[test]
    fn chain_below_a_wider_root() {
        // the root covers more cpus than the package, so the package starts a new line
        let mut topology = machine("0-1");
        let root = topology.root().index();
        let package = add(
            &mut topology,
            root,
            Node::new(ObjectKind::Package, 0).with_cpuset(cpus("0")),
        );
        let core = add(
            &mut topology,
            package,
            Node::new(ObjectKind::Core, 0).with_cpuset(cpus("0")),
        );
        add(
            &mut topology,
            core,
            Node::new(ObjectKind::Pu, 0).with_cpuset(cpus("0")),
        );
        let rendered = render(&topology);
        assert_eq!(
            rendered,
            "Machine (16GB total)\n  Package L#0 + Core L#0 + PU L#0"
        );
        assert_eq!(rendered.lines().count(), 2);
        assert_eq!(rendered.matches(SEPARATOR).count(), 2);
    }

    #[test]
    fn merge_count_does_not_depend_on_chain_length() {
        let kinds = [
            ObjectKind::Package,
            ObjectKind::L3Cache,
            ObjectKind::L2Cache,
            ObjectKind::L1Cache,
            ObjectKind::Core,
            ObjectKind::Pu,
        ];
        for n in 1..=kinds.len() {
            let rendered = render(&chain(&kinds[..n]));
            assert_eq!(rendered.lines().count(), 1);
            assert_eq!(rendered.matches(SEPARATOR).count(), n);
        }
    }

    #[test]
    fn second_child_breaks_the_line() {
        let mut topology = machine("0-1");
        let root = topology.root().index();
        let package = add(
            &mut topology,
            root,
            Node::new(ObjectKind::Package, 0).with_cpuset(cpus("0-1")),
        );
        add(
            &mut topology,
            package,
            Node::new(ObjectKind::Core, 0).with_cpuset(cpus("0-1")),
        );
        add(
            &mut topology,
            package,
            Node::new(ObjectKind::Core, 1).with_cpuset(cpus("0-1")),
        );
        assert_eq!(
            render(&topology),
            "Machine (16GB total) + Package L#0\n  Core L#0\n  Core L#1"
        );
    }

    #[test]
    fn memory_io_and_misc_children_break_the_line() {
        for extra in [ObjectKind::NumaNode, ObjectKind::Bridge, ObjectKind::Misc] {
            let mut topology = machine("0");
            let root = topology.root().index();
            let package = add(
                &mut topology,
                root,
                Node::new(ObjectKind::Package, 0).with_cpuset(cpus("0")),
            );
            add(
                &mut topology,
                package,
                Node::new(ObjectKind::Core, 0).with_cpuset(cpus("0")),
            );
            add(&mut topology, package, Node::new(extra, 0));
            let rendered = render(&topology);
            let lines: Vec<&str> = rendered.lines().collect();
            assert_eq!(lines[0], "Machine (16GB total) + Package L#0", "{extra}");
            assert!(lines.contains(&"  Core L#0"), "{extra}: {rendered}");
            assert_eq!(lines.len(), 3, "{extra}");
        }
    }

    #[test]
    fn missing_cpusets_never_merge() {
        let mut topology = machine("0");
        let root = topology.root().index();
        let package = add(&mut topology, root, Node::new(ObjectKind::Package, 0));
        add(
            &mut topology,
            package,
            Node::new(ObjectKind::Core, 0).with_cpuset(cpus("0")),
        );
        assert_eq!(
            render(&topology),
            "Machine (16GB total)\n  Package L#0\n    Core L#0"
        );
    }

    #[test]
    fn indentation_is_two_spaces_per_level() {
        let mut topology = machine("0-3");
        let mut parent = topology.root().index();
        let kinds = [ObjectKind::Package, ObjectKind::Group, ObjectKind::L3Cache];
        for (n, &kind) in kinds.iter().enumerate() {
            // a sibling at every level keeps every node on its own line
            add(
                &mut topology,
                parent,
                Node::new(kind, 1).with_cpuset(cpus("3")),
            );
            parent = add(
                &mut topology,
                parent,
                Node::new(kind, 0).with_cpuset(cpus(&format!("0-{}", 2 - n))),
            );
        }
        let rendered = render(&topology);
        for line in rendered.lines().skip(1) {
            let indent = line.len() - line.trim_start().len();
            let depth = match line.trim_start().split(' ').next().unwrap() {
                "Package" => 1,
                "Group" => 2,
                "L3Cache" => 3,
                other => panic!("unexpected line {other}"),
            };
            assert_eq!(indent, 2 * depth, "{line}");
        }
        assert_eq!(rendered.lines().count(), 7);
    }

    #[test]
    fn processing_units_never_get_their_own_line() {
        let mut topology = machine("0-1");
        let root = topology.root().index();
        let core = add(
            &mut topology,
            root,
            Node::new(ObjectKind::Core, 0).with_cpuset(cpus("0-1")),
        );
        add(
            &mut topology,
            core,
            Node::new(ObjectKind::Pu, 0).with_cpuset(cpus("0")),
        );
        add(
            &mut topology,
            core,
            Node::new(ObjectKind::Pu, 1).with_cpuset(cpus("1")),
        );
        let rendered = render(&topology);
        assert_eq!(rendered, "Machine (16GB total) + Core L#0");
        assert!(!rendered.contains("PU"));
    }

    #[test]
    fn memory_children_come_first() {
        let mut topology = machine("0-1");
        let root = topology.root().index();
        let package = add(
            &mut topology,
            root,
            Node::new(ObjectKind::Package, 0).with_cpuset(cpus("0-1")),
        );
        add(&mut topology, root, Node::new(ObjectKind::Misc, 0));
        let bridge = add(
            &mut topology,
            root,
            Node::new(ObjectKind::Bridge, 0).with_attributes(NodeAttributes::Bridge(
                BridgeAttributes::new(BridgeType::Host, Some(DownstreamBuses::new(0, 0, 0))),
            )),
        );
        add(
            &mut topology,
            bridge,
            Node::new(ObjectKind::PciDevice, 0).with_attributes(NodeAttributes::Pci(
                PciDeviceAttributes::new(BusLocation::new(0, 0, 2, 0), ClassId::new(0x0300)),
            )),
        );
        add(
            &mut topology,
            package,
            Node::new(ObjectKind::NumaNode, 0)
                .with_cpuset(cpus("0-1"))
                .with_attributes(NodeAttributes::NumaNode(NumaNodeAttributes::new(
                    ByteCount::new(16 << 30),
                ))),
        );
        let l3 = add(
            &mut topology,
            package,
            Node::new(ObjectKind::L3Cache, 0)
                .with_cpuset(cpus("0-1"))
                .with_attributes(NodeAttributes::Cache(
                    CacheAttributes::new(CacheType::Unified)
                        .with_size(ByteCount::new(12 << 20).unwrap()),
                )),
        );
        for n in 0..2 {
            let core = add(
                &mut topology,
                l3,
                Node::new(ObjectKind::Core, n).with_cpuset(cpus(&n.to_string())),
            );
            add(
                &mut topology,
                core,
                Node::new(ObjectKind::Pu, n).with_cpuset(cpus(&n.to_string())),
            );
        }
        assert_eq!(
            render(&topology),
            [
                "Machine (16GB total)",
                "  Package L#0",
                "    NUMANode L#0 (16GB)",
                "    L3Cache L#0 (12MB)",
                "      Core L#0 + PU L#0",
                "      Core L#1 + PU L#1",
                "  HostBridge",
                "    PCI 00:02.0 (VGA)",
                "  Misc",
            ]
            .join("\n")
        );
    }

    #[test]
    fn io_subtree_renders_os_devices() {
        let mut topology = machine("0");
        let root = topology.root().index();
        let bridge = add(&mut topology, root, Node::new(ObjectKind::Bridge, 0));
        let nvme = add(
            &mut topology,
            bridge,
            Node::new(ObjectKind::PciDevice, 0).with_attributes(NodeAttributes::Pci(
                PciDeviceAttributes::new(BusLocation::new(0, 1, 0, 0), ClassId::new(0x0108)),
            )),
        );
        add(
            &mut topology,
            nvme,
            Node::new(ObjectKind::OsDevice, 0)
                .with_subtype("Disk")
                .with_name("nvme0n1")
                .with_attributes(NodeAttributes::OsDevice(OsDeviceAttributes::new(
                    OsDeviceType::Block,
                ))),
        );
        assert_eq!(
            render(&topology),
            "Machine (16GB total)\n  HostBridge\n    PCI 01:00.0 (NVMExp)\n      Block(Disk) \"nvme0n1\""
        );
    }

    #[test]
    fn lone_root() {
        let topology = Topology::new(Node::new(ObjectKind::Machine, 0)).unwrap();
        assert_eq!(render(&topology), "Machine");
    }
}
