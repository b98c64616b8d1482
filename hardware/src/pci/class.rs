// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! PCI class codes.
//!
//! A 16-bit class code is a base class (upper byte) and a subclass (lower byte).  Naming is a
//! two level lookup: the exact class code among the known subclasses of its base class first,
//! then the name of the base class itself, then `"Other"`.
//!
//! ```
//! use topo_hardware::pci::class::{ClassId, class_name};
//!
//! assert_eq!(class_name(0x0106), "SATA");
//! assert_eq!(class_name(0x01ff), "Storage");
//! assert_eq!(class_name(0xffff), "Other");
//! assert_eq!(ClassId::new(0x0300).to_string(), "0300");
//! ```
//!
//! See <https://pci-ids.ucw.cz/read/PD/>.

use std::fmt::{Display, Formatter};

/// Name returned for class codes with no known base class.
pub const OTHER: &str = "Other";

/// Naming rules for one base class.
struct BaseClass {
    /// Exact class codes with their own name.
    subclasses: &'static [(u16, &'static str)],
    /// Name of the base class; `None` means unmatched subclasses fall through to [`OTHER`].
    name: Option<&'static str>,
}

impl BaseClass {
    const fn named(name: &'static str, subclasses: &'static [(u16, &'static str)]) -> Self {
        Self {
            subclasses,
            name: Some(name),
        }
    }
}

const UNCLASSIFIED: BaseClass = BaseClass {
    subclasses: &[(0x0001, "VGA")],
    name: None,
};

const STORAGE: BaseClass = BaseClass::named(
    "Storage",
    &[
        (0x0100, "SCSI"),
        (0x0101, "IDE"),
        (0x0102, "Floppy"),
        (0x0103, "IPI"),
        (0x0104, "RAID"),
        (0x0105, "ATA"),
        (0x0106, "SATA"),
        (0x0107, "SAS"),
        (0x0108, "NVMExp"),
    ],
);

const NETWORK: BaseClass = BaseClass::named(
    "Network",
    &[
        (0x0200, "Ethernet"),
        (0x0201, "TokenRing"),
        (0x0202, "FDDI"),
        (0x0203, "ATM"),
        (0x0204, "ISDN"),
        (0x0205, "WorldFip"),
        (0x0206, "PICMG"),
        (0x0207, "InfiniBand"),
        (0x0208, "Fabric"),
    ],
);

const DISPLAY: BaseClass =
    BaseClass::named("Display", &[(0x0300, "VGA"), (0x0301, "XGA"), (0x0302, "3D")]);

const MULTIMEDIA: BaseClass = BaseClass::named(
    "Multimedia",
    &[
        (0x0400, "MultimediaVideo"),
        (0x0401, "MultimediaAudio"),
        (0x0402, "Telephony"),
        (0x0403, "AudioDevice"),
    ],
);

const MEMORY: BaseClass = BaseClass::named(
    "Memory",
    &[(0x0500, "RAM"), (0x0501, "Flash"), (0x0502, "CXLMem")],
);

const BRIDGE: BaseClass = BaseClass::named(
    "Bridge",
    &[
        (0x0600, "HostBridge"),
        (0x0601, "ISABridge"),
        (0x0602, "EISABridge"),
        (0x0603, "MicroChannelBridge"),
        (0x0604, "PCIBridge"),
        (0x0605, "PCMCIABridge"),
        (0x0606, "NubusBridge"),
        (0x0607, "CardBusBridge"),
        (0x0608, "RACEwayBridge"),
        (0x0609, "SemiTransparentPCIBridge"),
        (0x060a, "InfiniBandPCIHostBridge"),
    ],
);

const COMMUNICATION: BaseClass = BaseClass::named(
    "Communication",
    &[
        (0x0700, "Serial"),
        (0x0701, "Parallel"),
        (0x0702, "MultiportSerial"),
        (0x0703, "Model"),
        (0x0704, "GPIB"),
        (0x0705, "SmartCard"),
    ],
);

const SYSTEM_PERIPHERAL: BaseClass = BaseClass::named(
    "SystemPeripheral",
    &[
        (0x0800, "PIC"),
        (0x0801, "DMA"),
        (0x0802, "Timer"),
        (0x0803, "RTC"),
        (0x0804, "PCIHotPlug"),
        (0x0805, "SDHost"),
        (0x0806, "IOMMU"),
    ],
);

const INPUT: BaseClass = BaseClass::named(
    "Input",
    &[
        (0x0900, "Keyboard"),
        (0x0901, "DigitizerPen"),
        (0x0902, "Mouse"),
        (0x0903, "Scanern"),
        (0x0904, "Gameport"),
    ],
);

const PROCESSOR: BaseClass = BaseClass::named(
    "Processor",
    &[
        (0x0b00, "386"),
        (0x0b01, "486"),
        (0x0b02, "Pentium"),
        (0x0b10, "Alpha"),
        (0x0b20, "PowerPC"),
        (0x0b30, "MIPS"),
        (0x0b40, "Co-Processor"),
    ],
);

const SERIAL_BUS: BaseClass = BaseClass::named(
    "SerialBus",
    &[
        (0x0c00, "FireWire"),
        (0x0c01, "ACCESS"),
        (0x0c02, "SSA"),
        (0x0c03, "USB"),
        (0x0c04, "FibreChannel"),
        (0x0c05, "SMBus"),
        (0x0c06, "InfiniBand"),
        (0x0c07, "IPMI-SMIC"),
        (0x0c08, "SERCOS"),
        (0x0c09, "CANBUS"),
    ],
);

const WIRELESS: BaseClass = BaseClass::named(
    "Wireless",
    &[
        (0x0d00, "IRDA"),
        (0x0d01, "ConsumerIR"),
        (0x0d10, "RF"),
        (0x0d11, "Bluetooth"),
        (0x0d12, "Broadband"),
        (0x0d20, "802.1a"),
        (0x0d21, "802.1b"),
    ],
);

const INTELLIGENT: BaseClass = BaseClass::named("Intelligent", &[(0x0e00, "I2O")]);

fn base_class(base: u8) -> Option<BaseClass> {
    Some(match base {
        0x00 => UNCLASSIFIED,
        0x01 => STORAGE,
        0x02 => NETWORK,
        0x03 => DISPLAY,
        0x04 => MULTIMEDIA,
        0x05 => MEMORY,
        0x06 => BRIDGE,
        0x07 => COMMUNICATION,
        0x08 => SYSTEM_PERIPHERAL,
        0x09 => INPUT,
        0x0a => BaseClass::named("DockingStation", &[]),
        0x0b => PROCESSOR,
        0x0c => SERIAL_BUS,
        0x0d => WIRELESS,
        0x0e => INTELLIGENT,
        0x0f => BaseClass::named("Satellite", &[]),
        0x10 => BaseClass::named("Encryption", &[]),
        0x11 => BaseClass::named("SignalProcessing", &[]),
        0x12 => BaseClass::named("ProcessingAccelerator", &[]),
        0x13 => BaseClass::named("Instrumentation", &[]),
        0x40 => BaseClass::named("Co-Processor", &[]),
        _ => return None,
    })
}

/// Returns a short name for a PCI class code.
///
/// Never fails and never returns an empty string.
#[must_use]
pub fn class_name(class_id: u16) -> &'static str {
    let Some(base) = base_class(ClassId::new(class_id).base()) else {
        return OTHER;
    };
    base.subclasses
        .iter()
        .find_map(|&(id, name)| (id == class_id).then_some(name))
        .or(base.name)
        .unwrap_or(OTHER)
}

/// A 16-bit PCI class code (base class and subclass, without the programming interface).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct ClassId(u16);

impl ClassId {
    #[must_use]
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u16 {
        self.0
    }

    /// The base class (upper byte).
    #[must_use]
    pub fn base(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// See [`class_name`].
    #[must_use]
    pub fn name(self) -> &'static str {
        class_name(self.0)
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}
