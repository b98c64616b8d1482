// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Operating system devices (block devices, network interfaces, GPUs, ...).

/// The type of an operating system device.
///
/// Parsing accepts the spellings used by the discovery library; anything else is kept verbatim
/// in [`OsDeviceType::Unknown`].
///
/// ```
/// use topo_hardware::os::OsDeviceType;
///
/// assert_eq!("network".parse::<OsDeviceType>().unwrap(), OsDeviceType::Network);
/// assert_eq!("CoProc".parse::<OsDeviceType>().unwrap(), OsDeviceType::CoProcessor);
/// assert_eq!(OsDeviceType::CoProcessor.to_string(), "Co-Processor");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum OsDeviceType {
    #[strum(to_string = "Block", serialize = "Storage")]
    Block,
    #[strum(to_string = "Network", serialize = "Net")]
    Network,
    OpenFabrics,
    #[strum(serialize = "DMA")]
    Dma,
    #[strum(serialize = "GPU")]
    Gpu,
    #[strum(to_string = "Co-Processor", serialize = "CoProcessor", serialize = "CoProc")]
    CoProcessor,
    Memory,
    #[strum(default)]
    Unknown(String),
}

/// Attributes of an `OSDevice` object.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OsDeviceAttributes {
    device_type: OsDeviceType,
}

impl OsDeviceAttributes {
    #[must_use]
    pub fn new(device_type: OsDeviceType) -> Self {
        Self { device_type }
    }

    #[must_use]
    pub fn device_type(&self) -> &OsDeviceType {
        &self.device_type
    }
}
