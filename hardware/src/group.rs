// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Logical groups of hardware components.

/// Attributes of a `Group` object.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct GroupAttributes {
    depth: Option<usize>,
}

impl GroupAttributes {
    /// Creates group attributes with a known group depth.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self { depth: Some(depth) }
    }

    /// The depth of this group among nested groups, if the discovery library reported one.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.depth
    }
}
