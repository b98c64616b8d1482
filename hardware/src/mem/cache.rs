// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! CPU caches.

use std::fmt::{Display, Formatter};
use std::num::NonZero;

use crate::ByteCount;

/// What a cache holds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, strum::Display)]
pub enum CacheType {
    /// Data and instructions.
    #[default]
    Unified,
    Data,
    Instruction,
}

impl CacheType {
    /// The letter hwloc puts after the level in a cache name (`L1d`, `L1i`, `L2`).
    #[must_use]
    pub fn letter(self) -> &'static str {
        match self {
            CacheType::Unified => "",
            CacheType::Data => "d",
            CacheType::Instruction => "i",
        }
    }
}

/// How many places of a cache a given memory line may be stored in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Associativity {
    /// Any line may go anywhere.
    Full,
    /// N-way set associative.
    Ways(NonZero<u32>),
}

impl Display for Associativity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Associativity::Full => f.write_str("full"),
            Associativity::Ways(ways) => write!(f, "{ways}"),
        }
    }
}

/// Attributes of a CPU cache object.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct CacheAttributes {
    cache_type: CacheType,
    size: Option<ByteCount>,
    line_size: Option<usize>,
    associativity: Option<Associativity>,
}

impl CacheAttributes {
    #[must_use]
    pub fn new(cache_type: CacheType) -> Self {
        Self {
            cache_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: ByteCount) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_line_size(mut self, line_size: usize) -> Self {
        self.line_size = Some(line_size);
        self
    }

    #[must_use]
    pub fn with_associativity(mut self, associativity: Associativity) -> Self {
        self.associativity = Some(associativity);
        self
    }

    #[must_use]
    pub fn cache_type(&self) -> CacheType {
        self.cache_type
    }

    /// Size of the cache in bytes, if known.
    #[must_use]
    pub fn size(&self) -> Option<ByteCount> {
        self.size
    }

    /// Size of a cache line in bytes, if known.
    #[must_use]
    pub fn line_size(&self) -> Option<usize> {
        self.line_size
    }

    /// Associativity, if known.
    #[must_use]
    pub fn associativity(&self) -> Option<Associativity> {
        self.associativity
    }
}
