// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Sets of processing unit indexes.
//!
//! A [`CpuSet`] is stored as sorted, disjoint, non-adjacent inclusive ranges, so two sets are
//! equal if and only if they contain the same indexes.  The text form is hwloc's list syntax:
//!
//! ```
//! use topo_hardware::cpuset::CpuSet;
//!
//! let set: CpuSet = "4-7,0-3,9".parse().unwrap();
//! assert_eq!(set, "0-7,9".parse().unwrap());
//! assert_eq!(set.to_string(), "0-7,9");
//!
//! // hwloc bitmaps may be infinite
//! let all: CpuSet = "0-".parse().unwrap();
//! assert_eq!(all.to_string(), "0-");
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A normalized set of processing unit indexes.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct CpuSet {
    ranges: Vec<(u32, u32)>,
}

/// Errors which may occur when parsing a [`CpuSet`] from hwloc list syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CpuSetParseError {
    #[error("invalid cpu index '{0}'")]
    InvalidIndex(String),
    #[error("reversed cpu range {0}-{1}")]
    ReversedRange(u32, u32),
}

impl CpuSet {
    /// Sorts and coalesces overlapping or adjacent ranges.
    fn normalize(&mut self) {
        self.ranges.sort_unstable();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(self.ranges.len());
        for &(first, last) in &self.ranges {
            match merged.last_mut() {
                Some((_, prev_last)) if first <= prev_last.saturating_add(1) => {
                    *prev_last = (*prev_last).max(last);
                }
                _ => merged.push((first, last)),
            }
        }
        self.ranges = merged;
    }
}

impl Display for CpuSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (n, &(first, last)) in self.ranges.iter().enumerate() {
            if n != 0 {
                write!(f, ",")?;
            }
            if last == u32::MAX {
                write!(f, "{first}-")?;
            } else if first == last {
                write!(f, "{first}")?;
            } else {
                write!(f, "{first}-{last}")?;
            }
        }
        Ok(())
    }
}

fn parse_index(raw: &str) -> Result<u32, CpuSetParseError> {
    raw.trim()
        .parse()
        .map_err(|_| CpuSetParseError::InvalidIndex(raw.to_string()))
}

impl FromStr for CpuSet {
    type Err = CpuSetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let range = match item.split_once('-') {
                None => {
                    let index = parse_index(item)?;
                    (index, index)
                }
                Some((first, "")) => (parse_index(first)?, u32::MAX),
                Some((first, last)) => {
                    let (first, last) = (parse_index(first)?, parse_index(last)?);
                    if first > last {
                        return Err(CpuSetParseError::ReversedRange(first, last));
                    }
                    (first, last)
                }
            };
            ranges.push(range);
        }
        let mut set = CpuSet { ranges };
        set.normalize();
        Ok(set)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn set(list: &str) -> CpuSet {
        list.parse().unwrap()
    }

    #[test]
    fn equality_is_set_equality() {
        assert_eq!(set("0-3"), set("3,2,1,0"));
        assert_eq!(set("0-1,2-3"), set("0-3"));
        assert_eq!(set("1-5,2-3"), set("1-5"));
        assert_ne!(set("0-3"), set("0-4"));
        assert_ne!(set("0-3"), set("0-"));
    }

    #[test]
    fn parse_and_print() {
        assert_eq!(set(" 8, 0-1 ,2-3,10-").to_string(), "0-3,8,10-");
        assert_eq!(set("4,6-7,5").to_string(), "4-7");
        assert_eq!(set("4294967295").to_string(), "4294967295-");
        assert_eq!(set(""), CpuSet::default());
        assert_eq!(CpuSet::default().to_string(), "");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            "3-1".parse::<CpuSet>(),
            Err(CpuSetParseError::ReversedRange(3, 1))
        );
        assert!(matches!(
            "0-x".parse::<CpuSet>(),
            Err(CpuSetParseError::InvalidIndex(_))
        ));
        assert!(matches!(
            "-4".parse::<CpuSet>(),
            Err(CpuSetParseError::InvalidIndex(_))
        ));
    }

    #[test]
    fn display_parse_contract() {
        bolero::check!()
            .with_type()
            .cloned()
            .for_each(|indexes: Vec<u16>| {
                let list = indexes
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                let parsed = set(&list);
                assert_eq!(set(&parsed.to_string()), parsed);
                let mut sorted = indexes.clone();
                sorted.sort_unstable();
                sorted.dedup();
                let sorted = sorted
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                assert_eq!(set(&sorted), parsed);
            });
    }
}
