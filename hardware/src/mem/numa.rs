// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! NUMA (Non-Uniform Memory Access) nodes.

use crate::ByteCount;

/// Attributes of a NUMA node.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct NumaNodeAttributes {
    local_memory: Option<ByteCount>,
}

impl NumaNodeAttributes {
    #[must_use]
    pub fn new(local_memory: Option<ByteCount>) -> Self {
        Self { local_memory }
    }

    /// Memory directly attached to this node, if known.
    #[must_use]
    pub fn local_memory(&self) -> Option<ByteCount> {
        self.local_memory
    }
}
