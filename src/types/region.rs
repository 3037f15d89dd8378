//! Regions and the continent grouping used for display.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A region id together with its human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
}

impl Region {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Continent a region is displayed under.
///
/// Derived from the region id by [`Continent::from_region`]; this is a
/// display heuristic, not provider metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Continent {
    #[serde(rename = "Asia")]
    Asia,
    #[serde(rename = "Australia")]
    Australia,
    #[serde(rename = "Europe")]
    Europe,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    #[serde(rename = "Africa")]
    Africa,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Continent {
    /// Every continent a region can be grouped under (excludes `Unknown`).
    pub const ALL: [Continent; 6] = [
        Continent::Asia,
        Continent::Australia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Africa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Continent::Asia => "Asia",
            Continent::Australia => "Australia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Africa => "Africa",
            Continent::Unknown => "unknown",
        }
    }

    /// Guess the continent of a region id by substring and prefix matching.
    ///
    /// Order matters: `ap-southeast-2` is Sydney, so Australia is checked
    /// before the generic `ap-` Asia rule.
    pub fn from_region(region: &str) -> Continent {
        let contains_any = |needles: &[&str]| needles.iter().any(|n| region.contains(n));
        let starts_with_any = |prefixes: &[&str]| prefixes.iter().any(|p| region.starts_with(p));

        if contains_any(&["ap-southeast-2", "australia"]) {
            Continent::Australia
        } else if contains_any(&["cn-", "ap-", "me-", "asia", "japan", "india", "korea"])
            || starts_with_any(&["sgp", "blr"])
        {
            Continent::Asia
        } else if contains_any(&["eu", "uk", "france"]) || starts_with_any(&["ams", "lon", "fra"])
        {
            Continent::Europe
        } else if contains_any(&["us", "ca-central-1", "canada", "northamerica"])
            || starts_with_any(&["nyc", "sfo", "tor"])
        {
            Continent::NorthAmerica
        } else if contains_any(&["southamerica", "brazil", "sa-"]) {
            Continent::SouthAmerica
        } else if contains_any(&["africa", "af-"]) {
            Continent::Africa
        } else {
            Continent::Unknown
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
