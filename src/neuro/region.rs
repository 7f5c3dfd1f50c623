use std::fmt;

use serde::{Deserialize, Serialize};

/// Anatomical tag carried by every section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Soma,
    Axon,
    Dend,
    Apic,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Soma, Region::Axon, Region::Dend, Region::Apic];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Soma => "soma",
            Region::Axon => "axon",
            Region::Dend => "dend",
            Region::Apic => "apic",
        }
    }

    /// Maps an SWC structure identifier onto a region. Custom types fall
    /// back to `None` and are handled by the caller.
    pub fn from_swc_type(kind: i32) -> Option<Region> {
        match kind {
            1 => Some(Region::Soma),
            2 => Some(Region::Axon),
            3 => Some(Region::Dend),
            4 => Some(Region::Apic),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks sections either by region tag or all of them at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    All,
    Soma,
    Axon,
    Dend,
    Apic,
}

impl Selector {
    pub fn matches(self, region: Region) -> bool {
        match self.region() {
            None => true,
            Some(only) => only == region,
        }
    }

    pub fn region(self) -> Option<Region> {
        match self {
            Selector::All => None,
            Selector::Soma => Some(Region::Soma),
            Selector::Axon => Some(Region::Axon),
            Selector::Dend => Some(Region::Dend),
            Selector::Apic => Some(Region::Apic),
        }
    }
}

impl From<Region> for Selector {
    fn from(region: Region) -> Self {
        match region {
            Region::Soma => Selector::Soma,
            Region::Axon => Selector::Axon,
            Region::Dend => Selector::Dend,
            Region::Apic => Selector::Apic,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.region() {
            None => f.write_str("all"),
            Some(region) => region.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_selector_matches_every_region() {
        for region in Region::ALL {
            assert!(Selector::All.matches(region));
            assert!(Selector::from(region).matches(region));
        }
        assert!(!Selector::Soma.matches(Region::Apic));
    }

    #[test]
    fn swc_types_map_to_regions() {
        assert_eq!(Region::from_swc_type(1), Some(Region::Soma));
        assert_eq!(Region::from_swc_type(4), Some(Region::Apic));
        assert_eq!(Region::from_swc_type(7), None);
    }
}
