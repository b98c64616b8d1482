// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! PCI devices: bus location, identifiers and class codes.

pub mod bridge;
pub mod class;

use std::fmt::{Display, Formatter};

use crate::pci::class::ClassId;

/// Location of a PCI function on the bus.
///
/// The `Display` form is the short `bus:device.function` form used in topology trees.  The
/// alternate form (`{:#}`) includes the domain.
///
/// ```
/// use topo_hardware::pci::BusLocation;
///
/// let location = BusLocation::new(0, 0x3b, 0x1f, 2);
/// assert_eq!(format!("{location}"), "3b:1f.2");
/// assert_eq!(format!("{location:#}"), "0000:3b:1f.2");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BusLocation {
    domain: u32,
    bus: u8,
    device: u8,
    function: u8,
}

impl BusLocation {
    #[must_use]
    pub fn new(domain: u32, bus: u8, device: u8, function: u8) -> Self {
        Self {
            domain,
            bus,
            device,
            function,
        }
    }

    #[must_use]
    pub fn domain(&self) -> u32 {
        self.domain
    }

    #[must_use]
    pub fn bus(&self) -> u8 {
        self.bus
    }

    #[must_use]
    pub fn device(&self) -> u8 {
        self.device
    }

    #[must_use]
    pub fn function(&self) -> u8 {
        self.function
    }
}

impl Display for BusLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{:04x}:", self.domain)?;
        }
        write!(f, "{:02x}:{:02x}.{:01x}", self.bus, self.device, self.function)
    }
}

/// A 16-bit PCI vendor identifier.
///
/// Vendor IDs are assigned by the PCI-SIG.  The special value `0xFFFF` is reserved and indicates
/// an invalid/non-existent device.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct VendorId(u16);

impl VendorId {
    #[must_use]
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u16 {
        self.0
    }

    /// Checks if this vendor ID is the reserved invalid value.
    #[must_use]
    pub fn is_invalid(self) -> bool {
        self.0 == 0xFFFF
    }
}

impl Display for VendorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// A 16-bit PCI device identifier, scoped to a [`VendorId`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct DeviceId(u16);

impl DeviceId {
    #[must_use]
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u16 {
        self.0
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// Attributes of a PCI device (function).
#[derive(Clone, Debug, PartialEq)]
pub struct PciDeviceAttributes {
    location: BusLocation,
    class_id: ClassId,
    vendor_id: VendorId,
    device_id: DeviceId,
    link_speed: Option<f32>,
}

impl PciDeviceAttributes {
    #[must_use]
    pub fn new(location: BusLocation, class_id: ClassId) -> Self {
        Self {
            location,
            class_id,
            vendor_id: VendorId::default(),
            device_id: DeviceId::default(),
            link_speed: None,
        }
    }

    #[must_use]
    pub fn with_ids(mut self, vendor_id: VendorId, device_id: DeviceId) -> Self {
        self.vendor_id = vendor_id;
        self.device_id = device_id;
        self
    }

    /// Sets the link speed in GB/s.  Non-positive speeds mean unknown.
    #[must_use]
    pub fn with_link_speed(mut self, gb_per_sec: f32) -> Self {
        self.link_speed = (gb_per_sec > 0.0).then_some(gb_per_sec);
        self
    }

    #[must_use]
    pub fn location(&self) -> BusLocation {
        self.location
    }

    #[must_use]
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    #[must_use]
    pub fn vendor_id(&self) -> VendorId {
        self.vendor_id
    }

    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    /// Link speed in GB/s, if known.
    #[must_use]
    pub fn link_speed(&self) -> Option<f32> {
        self.link_speed
    }
}
