// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! PCI bridges.

/// The kind of bus on either side of a bridge.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
pub enum BridgeType {
    /// The host (root complex) side of a host bridge.
    Host,
    #[strum(serialize = "PCI")]
    Pci,
}

/// The range of PCI buses reachable below a bridge.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DownstreamBuses {
    domain: u32,
    secondary: u8,
    subordinate: u8,
}

impl DownstreamBuses {
    #[must_use]
    pub fn new(domain: u32, secondary: u8, subordinate: u8) -> Self {
        Self {
            domain,
            secondary,
            subordinate,
        }
    }

    #[must_use]
    pub fn domain(&self) -> u32 {
        self.domain
    }

    #[must_use]
    pub fn secondary(&self) -> u8 {
        self.secondary
    }

    #[must_use]
    pub fn subordinate(&self) -> u8 {
        self.subordinate
    }
}

impl std::fmt::Display for DownstreamBuses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04x}:[{:02x}-{:02x}]",
            self.domain, self.secondary, self.subordinate
        )
    }
}

/// Attributes of a bridge object.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BridgeAttributes {
    upstream: BridgeType,
    downstream: Option<DownstreamBuses>,
}

impl BridgeAttributes {
    #[must_use]
    pub fn new(upstream: BridgeType, downstream: Option<DownstreamBuses>) -> Self {
        Self {
            upstream,
            downstream,
        }
    }

    #[must_use]
    pub fn upstream_type(&self) -> BridgeType {
        self.upstream
    }

    /// The PCI buses below this bridge, if the downstream side is PCI.
    #[must_use]
    pub fn downstream_buses(&self) -> Option<DownstreamBuses> {
        self.downstream
    }
}
