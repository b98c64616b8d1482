// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! One-line labels for topology nodes.
//!
//! A label is the type name (with the subtype in parentheses), the logical index, the PCI bus
//! location and class, a parenthesized attribute group, the total memory of the root and the
//! name of OS devices:
//!
//! ```text
//! Machine (16GB total)
//! L3Cache L#0 (12MB)
//! PCI 00:02.0 (VGA)
//! Block(Disk) "nvme0n1"
//! ```

use std::borrow::Cow;
use std::fmt::{Display, Formatter, Write};

use crate::mem::MemorySize;
use crate::os::OsDeviceType;
use crate::pci::bridge::BridgeType;
use crate::render::RenderOptions;
use crate::topology::{Collection, NodeRef};
use crate::{NodeAttributes, ObjectKind};

/// The type name of a node, as hwloc spells it in verbose mode.
#[must_use]
pub fn type_name(node: NodeRef<'_>) -> Cow<'static, str> {
    let kind = node.kind();
    match (kind, node.node().attributes()) {
        (_, Some(NodeAttributes::Cache(cache))) if kind.cache_level().is_some() => {
            let level = kind.cache_level().unwrap_or_default();
            Cow::Owned(format!("L{level}{}Cache", cache.cache_type().letter()))
        }
        _ if kind.is_instruction_cache() => {
            let level = kind.cache_level().unwrap_or_default();
            Cow::Owned(format!("L{level}iCache"))
        }
        (ObjectKind::Group, Some(NodeAttributes::Group(group))) => match group.depth() {
            Some(depth) => Cow::Owned(format!("Group{depth}")),
            None => Cow::Borrowed("Group"),
        },
        (ObjectKind::Bridge, Some(NodeAttributes::Bridge(bridge)))
            if bridge.upstream_type() == BridgeType::Pci =>
        {
            Cow::Borrowed("PCIBridge")
        }
        (ObjectKind::Bridge, _) => Cow::Borrowed("HostBridge"),
        (ObjectKind::PciDevice, _) => Cow::Borrowed("PCI"),
        (ObjectKind::OsDevice, Some(NodeAttributes::OsDevice(os))) => match os.device_type() {
            OsDeviceType::Unknown(_) => Cow::Borrowed("OSDev"),
            known => Cow::Owned(known.to_string()),
        },
        _ => Cow::Owned(kind.to_string()),
    }
}

/// The space separated attribute string of a node, without parentheses.
///
/// Without `verbose` only NUMA node memory and cache sizes are shown.
#[must_use]
pub fn attributes(node: NodeRef<'_>, verbose: bool) -> String {
    let mut parts: Vec<String> = Vec::new();
    match node.node().attributes() {
        Some(NodeAttributes::NumaNode(numa)) => {
            if let Some(memory) = numa.local_memory() {
                let size = MemorySize::scale(memory.get(), verbose);
                parts.push(if verbose {
                    format!("local={size}")
                } else {
                    size.to_string()
                });
            }
        }
        Some(NodeAttributes::Cache(cache)) => {
            if let Some(size) = cache.size() {
                let size = MemorySize::scale(size.get(), verbose);
                parts.push(if verbose {
                    format!("size={size}")
                } else {
                    size.to_string()
                });
            }
            if verbose && let Some(line_size) = cache.line_size() {
                parts.push(format!("linesize={line_size}"));
            }
            if verbose && let Some(associativity) = cache.associativity() {
                parts.push(format!("ways={associativity}"));
            }
        }
        Some(NodeAttributes::Group(group)) if verbose => {
            if let Some(depth) = group.depth() {
                parts.push(format!("depth={depth}"));
            }
        }
        Some(NodeAttributes::Pci(pci)) if verbose => {
            parts.push(format!("busid={:#}", pci.location()));
            parts.push(format!("id={}:{}", pci.vendor_id(), pci.device_id()));
            parts.push(format!(
                "class={}({})",
                pci.class_id(),
                pci.class_id().name()
            ));
            if let Some(speed) = pci.link_speed() {
                parts.push(format!("link={speed:.2}GB/s"));
            }
        }
        Some(NodeAttributes::Bridge(bridge)) if verbose => {
            if let Some(buses) = bridge.downstream_buses() {
                parts.push(format!("buses={buses}"));
            }
        }
        _ => {}
    }
    if verbose {
        for (key, value) in node.node().properties() {
            if value.contains(' ') {
                parts.push(format!("{key}=\"{value}\""));
            } else {
                parts.push(format!("{key}={value}"));
            }
        }
    }
    parts.join(" ")
}

/// Formats the label of one node.
pub struct Label<'t> {
    node: NodeRef<'t>,
    options: RenderOptions,
}

impl<'t> Label<'t> {
    #[must_use]
    pub fn new(node: NodeRef<'t>, options: RenderOptions) -> Self {
        Self { node, options }
    }
}

impl Display for Label<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let node = self.node.node();
        let kind = node.kind();

        f.write_str(&type_name(self.node))?;
        if let Some(subtype) = node.subtype() {
            write!(f, "({subtype})")?;
        }

        if self.node.depth() != 0
            && matches!(kind.collection(), Collection::Normal | Collection::Memory)
        {
            write!(f, " L#{}", node.logical_index())?;
        }

        if let Some(NodeAttributes::Pci(pci)) = node.attributes() {
            write!(f, " {} ({})", pci.location(), pci.class_id().name())?;
        }

        let physical = match node.os_index() {
            Some(os_index) if self.options.physical => format!("P#{os_index}"),
            _ => String::new(),
        };
        let attributes = attributes(self.node, self.options.verbose);
        if !physical.is_empty() || !attributes.is_empty() {
            f.write_str(" (")?;
            f.write_str(&physical)?;
            if !physical.is_empty() && !attributes.is_empty() {
                f.write_char(' ')?;
            }
            f.write_str(&attributes)?;
            f.write_char(')')?;
        }

        if self.node.is_root()
            && let Some(total) = node.total_memory()
        {
            write!(f, " ({} total)", MemorySize::scale(total.get(), false))?;
        }

        if kind == ObjectKind::OsDevice
            && let Some(name) = node.name()
        {
            write!(f, " \"{name}\"")?;
        }
        Ok(())
    }
}
