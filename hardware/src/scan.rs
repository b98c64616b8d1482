// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Topology discovery backed by hwloc (through the `hwlocality` crate).
//!
//! The hwloc object tree is copied into a [`Topology`] arena as soon as it is loaded, so nothing
//! downstream of [`Discovery::load`] borrows from the library.

use std::ffi::CStr;
use std::num::NonZero;
use std::path::PathBuf;

use hwlocality::object::TopologyObject;
use hwlocality::object::attributes::{CacheAssociativity, DownstreamAttributes, ObjectAttributes};
use hwlocality::object::types::{
    BridgeType as HwlocBridgeType, CacheType as HwlocCacheType, ObjectType,
};
use hwlocality::topology::builder::{BuildFlags, TopologyBuilder, TypeFilter};
use pci_ids::{Device, FromId, Vendor};
use tracing::{debug, trace, warn};

use crate::cpuset::CpuSet;
use crate::discovery::{Discovery, DiscoveryError, Step};
use crate::group::GroupAttributes;
use crate::mem::cache::{Associativity, CacheAttributes, CacheType};
use crate::mem::numa::NumaNodeAttributes;
use crate::os::{OsDeviceAttributes, OsDeviceType};
use crate::pci::bridge::{BridgeAttributes, BridgeType, DownstreamBuses};
use crate::pci::class::ClassId;
use crate::pci::{BusLocation, DeviceId, PciDeviceAttributes, VendorId};
use crate::topology::{NodeIndex, Topology, TopologyError};
use crate::{Node, NodeAttributes, ObjectKind};

/// Info keys hwloc uses for PCI vendor and device names.
const PCI_VENDOR_INFO: &str = "PCIVendor";
const PCI_DEVICE_INFO: &str = "PCIDevice";

/// Where the topology comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// The machine this process runs on.
    Host,
    /// A topology previously exported to XML.
    Xml(PathBuf),
}

/// hwloc discovery.
///
/// ```no_run
/// use topo_hardware::discovery::list;
/// use topo_hardware::render::RenderOptions;
/// use topo_hardware::scan::HwlocDiscovery;
///
/// let mut discovery = HwlocDiscovery::host();
/// list(&mut discovery, RenderOptions::default(), &mut std::io::stdout()).unwrap();
/// ```
pub struct HwlocDiscovery {
    source: Source,
    builder: Option<TopologyBuilder>,
    topology: Option<hwlocality::Topology>,
}

impl HwlocDiscovery {
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self {
            source,
            builder: None,
            topology: None,
        }
    }

    /// Discovers the host topology.
    #[must_use]
    pub fn host() -> Self {
        Self::new(Source::Host)
    }

    /// Loads a topology from an XML export instead of the host.
    #[must_use]
    pub fn from_xml(path: impl Into<PathBuf>) -> Self {
        Self::new(Source::Xml(path.into()))
    }

    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Applies one builder step, keeping the builder on success.
    fn configure(
        &mut self,
        step: Step,
        apply: impl FnOnce(TopologyBuilder) -> Result<TopologyBuilder, String>,
    ) -> Result<(), DiscoveryError> {
        let builder = self.builder.take().ok_or_else(|| DiscoveryError::Config {
            step,
            reason: "topology is not initialized".to_string(),
        })?;
        self.builder = Some(apply(builder).map_err(|reason| DiscoveryError::Config { step, reason })?);
        Ok(())
    }
}

impl Discovery for HwlocDiscovery {
    fn init(&mut self) -> Result<(), DiscoveryError> {
        let builder = hwlocality::Topology::builder();
        let builder = match &self.source {
            Source::Host => builder,
            Source::Xml(path) => builder
                .from_xml_file(path)
                .map_err(|e| DiscoveryError::Init {
                    reason: format!("{}: {e}", path.display()),
                })?,
        };
        self.builder = Some(builder);
        Ok(())
    }

    fn configure_filters(&mut self) -> Result<(), DiscoveryError> {
        self.configure(Step::Filters, |builder| {
            builder
                .with_common_type_filter(TypeFilter::KeepAll)
                .map_err(|e| e.to_string())?
                .with_io_type_filter(TypeFilter::KeepImportant)
                .map_err(|e| e.to_string())
        })
    }

    fn set_flags(&mut self) -> Result<(), DiscoveryError> {
        self.configure(Step::Flags, |builder| {
            builder
                .with_flags(BuildFlags::IMPORT_SUPPORT)
                .map_err(|e| e.to_string())
        })
    }

    fn load(&mut self) -> Result<Topology, DiscoveryError> {
        let builder = self.builder.take().ok_or_else(|| DiscoveryError::Load {
            reason: "topology is not initialized".to_string(),
        })?;
        let hwloc = builder.build().map_err(|e| DiscoveryError::Load {
            reason: e.to_string(),
        })?;
        let topology = import(hwloc.root_object()).map_err(|e| DiscoveryError::Load {
            reason: e.to_string(),
        })?;
        self.topology = Some(hwloc);
        Ok(topology)
    }

    fn destroy(&mut self) {
        self.builder = None;
        if self.topology.take().is_some() {
            debug!("released hwloc topology");
        }
    }
}

/// Copies the hwloc tree below `root` into an arena.
fn import(root: &TopologyObject) -> Result<Topology, TopologyError> {
    let mut node = convert(root);
    if let Some(total) = NonZero::new(root.total_memory()) {
        node = node.with_total_memory(total);
    }
    let mut topology = Topology::new(node)?;
    let root_index = topology.root().index();
    import_children(&mut topology, root_index, root)?;
    Ok(topology)
}

fn import_children(
    topology: &mut Topology,
    parent: NodeIndex,
    object: &TopologyObject,
) -> Result<(), TopologyError> {
    let children = object
        .normal_children()
        .chain(object.memory_children())
        .chain(object.io_children())
        .chain(object.misc_children());
    for child in children {
        let index = topology.attach(parent, convert(child))?;
        import_children(topology, index, child)?;
    }
    Ok(())
}

fn text(value: &CStr) -> String {
    value.to_string_lossy().into_owned()
}

/// Converts one hwloc object, without its children.
fn convert(object: &TopologyObject) -> Node {
    let kind = object_kind(object);
    trace!(%kind, logical_index = object.logical_index(), "importing object");
    let mut node = Node::new(kind, object.logical_index());
    if let Some(subtype) = object.subtype() {
        node = node.with_subtype(text(subtype));
    }
    if let Some(os_index) = object.os_index() {
        node = node.with_os_index(os_index);
    }
    if let Some(name) = object.name() {
        node = node.with_name(text(name));
    }
    if let Some(cpuset) = object.cpuset() {
        match cpuset.to_string().parse::<CpuSet>() {
            Ok(cpuset) => node = node.with_cpuset(cpuset),
            Err(e) => warn!(%kind, "ignoring cpuset: {e}"),
        }
    }
    for info in object.infos() {
        node = node.with_property(text(info.name()), text(info.value()));
    }
    if let Some(attributes) = object.attributes().map(convert_attributes) {
        if let NodeAttributes::Pci(pci) = &attributes {
            node = with_pci_names(node, pci);
        }
        node = node.with_attributes(attributes);
    }
    node
}

fn object_kind(object: &TopologyObject) -> ObjectKind {
    match object.object_type() {
        ObjectType::Machine => ObjectKind::Machine,
        ObjectType::Package => ObjectKind::Package,
        ObjectType::Die => ObjectKind::Die,
        ObjectType::Core => ObjectKind::Core,
        ObjectType::PU => ObjectKind::Pu,
        ObjectType::L1Cache => ObjectKind::L1Cache,
        ObjectType::L2Cache => ObjectKind::L2Cache,
        ObjectType::L3Cache => ObjectKind::L3Cache,
        ObjectType::L4Cache => ObjectKind::L4Cache,
        ObjectType::L5Cache => ObjectKind::L5Cache,
        ObjectType::L1ICache => ObjectKind::L1ICache,
        ObjectType::L2ICache => ObjectKind::L2ICache,
        ObjectType::L3ICache => ObjectKind::L3ICache,
        ObjectType::Group => ObjectKind::Group,
        ObjectType::NUMANode => ObjectKind::NumaNode,
        ObjectType::MemCache => ObjectKind::MemCache,
        ObjectType::Bridge => ObjectKind::Bridge,
        ObjectType::PCIDevice => ObjectKind::PciDevice,
        ObjectType::OSDevice => ObjectKind::OsDevice,
        ObjectType::Misc => ObjectKind::Misc,
        other => {
            warn!("unsupported object type {other}, importing it as Misc");
            ObjectKind::Misc
        }
    }
}

fn convert_attributes(attributes: ObjectAttributes<'_>) -> NodeAttributes {
    match attributes {
        ObjectAttributes::NUMANode(numa) => {
            NodeAttributes::NumaNode(NumaNodeAttributes::new(numa.local_memory()))
        }
        ObjectAttributes::Cache(cache) => {
            let cache_type = match cache.cache_type() {
                HwlocCacheType::Data => CacheType::Data,
                HwlocCacheType::Instruction => CacheType::Instruction,
                _ => CacheType::Unified,
            };
            let mut attributes = CacheAttributes::new(cache_type);
            if let Some(size) = cache.size() {
                attributes = attributes.with_size(size);
            }
            if let Some(line_size) = cache.line_size() {
                attributes = attributes.with_line_size(usize::from(line_size));
            }
            if let Some(associativity) = associativity(cache.associativity()) {
                attributes = attributes.with_associativity(associativity);
            }
            NodeAttributes::Cache(attributes)
        }
        ObjectAttributes::Group(group) => {
            NodeAttributes::Group(GroupAttributes::new(group.depth()))
        }
        ObjectAttributes::PCIDevice(pci) => {
            let location = BusLocation::new(
                u32::from(pci.domain()),
                pci.bus_id(),
                pci.bus_device(),
                pci.function(),
            );
            NodeAttributes::Pci(
                PciDeviceAttributes::new(location, ClassId::new(pci.class_id()))
                    .with_ids(VendorId::new(pci.vendor_id()), DeviceId::new(pci.device_id()))
                    .with_link_speed(pci.link_speed()),
            )
        }
        ObjectAttributes::Bridge(bridge) => {
            let upstream = match bridge.upstream_type() {
                HwlocBridgeType::Host => BridgeType::Host,
                _ => BridgeType::Pci,
            };
            let downstream = bridge.downstream_attributes().map(|downstream| match downstream {
                DownstreamAttributes::PCI(pci) => DownstreamBuses::new(
                    u32::from(pci.domain()),
                    pci.secondary_bus(),
                    pci.subordinate_bus(),
                ),
            });
            NodeAttributes::Bridge(BridgeAttributes::new(upstream, downstream))
        }
        ObjectAttributes::OSDevice(os) => {
            let device_type = os
                .device_type()
                .to_string()
                .parse::<OsDeviceType>()
                .unwrap_or_else(|_| OsDeviceType::Unknown(os.device_type().to_string()));
            NodeAttributes::OsDevice(OsDeviceAttributes::new(device_type))
        }
    }
}

fn associativity(associativity: CacheAssociativity) -> Option<Associativity> {
    match associativity {
        CacheAssociativity::Full => Some(Associativity::Full),
        CacheAssociativity::Ways(ways) => u32::try_from(ways.get())
            .ok()
            .and_then(NonZero::new)
            .map(Associativity::Ways),
        CacheAssociativity::Unknown => None,
    }
}

/// Fills the PCI vendor and device names from the PCI ID database when hwloc left them out.
fn with_pci_names(mut node: Node, pci: &PciDeviceAttributes) -> Node {
    if pci.vendor_id().is_invalid() {
        return node;
    }
    let (vid, pid) = (pci.vendor_id().value(), pci.device_id().value());
    if !node.properties().contains_key(PCI_VENDOR_INFO)
        && let Some(vendor) = Vendor::from_id(vid)
    {
        node = node.with_property(PCI_VENDOR_INFO, vendor.name());
    }
    if !node.properties().contains_key(PCI_DEVICE_INFO)
        && let Some(device) = Device::from_vid_pid(vid, pid)
    {
        node = node.with_property(PCI_DEVICE_INFO, device.name());
    }
    node
}
