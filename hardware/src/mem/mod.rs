// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Memory hierarchy: caches, NUMA nodes and human readable memory sizes.

pub mod cache;
pub mod numa;

use std::fmt::{Display, Formatter};

const KIB_THRESHOLD: u64 = 10 << 20;
const MIB_THRESHOLD: u64 = 10 << 30;

/// Unit of a [`MemorySize`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
pub enum SizeUnit {
    #[strum(serialize = "KB")]
    Kilo,
    #[strum(serialize = "MB")]
    Mega,
    #[strum(serialize = "GB")]
    Giga,
}

impl SizeUnit {
    fn shift(self) -> u32 {
        match self {
            SizeUnit::Kilo => 10,
            SizeUnit::Mega => 20,
            SizeUnit::Giga => 30,
        }
    }
}

/// A byte count scaled to KB, MB or GB for display.
///
/// Sizes below 10 MiB (or any size when `verbose`) are shown in KB, sizes below 10 GiB in MB and
/// anything larger in GB.  The value is rounded half up by shifting one bit less than the unit,
/// adding one and halving, so it never drifts the way float rounding would.
///
/// ```
/// use topo_hardware::mem::MemorySize;
///
/// assert_eq!(MemorySize::scale(16 << 30, false).to_string(), "16GB");
/// assert_eq!(MemorySize::scale(48 << 10, false).to_string(), "48KB");
/// assert_eq!(MemorySize::scale(12 << 20, true).to_string(), "12288KB");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MemorySize {
    value: u64,
    unit: SizeUnit,
}

impl MemorySize {
    #[must_use]
    pub fn scale(bytes: u64, verbose: bool) -> Self {
        let unit = if bytes < KIB_THRESHOLD || verbose {
            SizeUnit::Kilo
        } else if bytes < MIB_THRESHOLD {
            SizeUnit::Mega
        } else {
            SizeUnit::Giga
        };
        let value = ((bytes >> (unit.shift() - 1)) + 1) >> 1;
        Self { value, unit }
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    #[must_use]
    pub fn unit(&self) -> SizeUnit {
        self.unit
    }
}

impl Display for MemorySize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}
