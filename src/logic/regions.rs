//! Region Catalog
//!
//! The fixed set of delivery regions. Order is part of the contract:
//! scenario pairing walks regions in this order.

use serde::{Deserialize, Serialize};

/// Delivery region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Penrith,
    Blacktown,
    Parramatta,
    Liverpool,
    Fairfield,
    Campbelltown,
    Camden,
    Windsor,
    Richmond,
    #[serde(rename = "St Marys")]
    StMarys,
    #[serde(rename = "Mount Druitt")]
    MountDruitt,
    #[serde(rename = "Rouse Hill")]
    RouseHill,
}

/// Number of regions in the catalog
pub const REGION_COUNT: usize = 12;

/// Catalog in canonical order
pub const REGIONS: [Region; REGION_COUNT] = [
    Region::Penrith,
    Region::Blacktown,
    Region::Parramatta,
    Region::Liverpool,
    Region::Fairfield,
    Region::Campbelltown,
    Region::Camden,
    Region::Windsor,
    Region::Richmond,
    Region::StMarys,
    Region::MountDruitt,
    Region::RouseHill,
];

impl Region {
    pub fn name(&self) -> &'static str {
        match self {
            Region::Penrith => "Penrith",
            Region::Blacktown => "Blacktown",
            Region::Parramatta => "Parramatta",
            Region::Liverpool => "Liverpool",
            Region::Fairfield => "Fairfield",
            Region::Campbelltown => "Campbelltown",
            Region::Camden => "Camden",
            Region::Windsor => "Windsor",
            Region::Richmond => "Richmond",
            Region::StMarys => "St Marys",
            Region::MountDruitt => "Mount Druitt",
            Region::RouseHill => "Rouse Hill",
        }
    }

    /// Position in the catalog
    pub fn index(&self) -> usize {
        REGIONS.iter().position(|r| r == self).unwrap_or(0)
    }

    /// Lookup by display name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Region> {
        REGIONS
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_complete_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for region in REGIONS {
            assert!(seen.insert(region));
        }
        assert_eq!(seen.len(), REGION_COUNT);
    }

    #[test]
    fn test_index_matches_catalog_order() {
        for (i, region) in REGIONS.iter().enumerate() {
            assert_eq!(region.index(), i);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Region::from_name("st marys"), Some(Region::StMarys));
        assert_eq!(Region::from_name("Parramatta"), Some(Region::Parramatta));
        assert_eq!(Region::from_name("Sydney CBD"), None);
    }

    #[test]
    fn test_serde_uses_display_name() {
        let json = serde_json::to_string(&Region::MountDruitt).unwrap();
        assert_eq!(json, "\"Mount Druitt\"");
        let back: Region = serde_json::from_str("\"Rouse Hill\"").unwrap();
        assert_eq!(back, Region::RouseHill);
    }
}
