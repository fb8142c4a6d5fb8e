//! Coordinate reference systems
//!
//! A CRS is identified by its EPSG code. Identifiers that carry no code (a
//! WKT name, an unknown URN) are kept verbatim so they can be reported, but
//! nothing can be reprojected from or to them.

mod transform;

pub use transform::{
    parse_utm_epsg, reproject_geometry, wgs84_to_osgb36, Ellipsoid, TransverseMercator,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG code of WGS84 geographic coordinates.
pub const EPSG_WGS84: u32 = 4326;
/// EPSG code of the Ordnance Survey British National Grid.
pub const EPSG_BRITISH_NATIONAL_GRID: u32 = 27700;

const MAX_NAME_IN_IDENTIFIER: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CRS {
    epsg: Option<u32>,
    /// Source identifier when no EPSG code could be read from it
    name: Option<String>,
}

impl CRS {
    pub fn from_epsg(code: u32) -> Self {
        Self { epsg: Some(code), name: None }
    }

    /// A CRS known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { epsg: None, name: Some(name.into()) }
    }

    /// Parse a CRS identifier.
    ///
    /// Accepts `EPSG:27700`, `epsg:27700`, a bare `27700`, and the OGC URN form
    /// `urn:ogc:def:crs:EPSG::27700`. `CRS84` maps to WGS84. Anything else is
    /// kept as a named CRS; only blank text gives `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if s.eq_ignore_ascii_case("crs84") || s.ends_with(":CRS84") {
            return Some(Self::wgs84());
        }
        let code = s.rsplit(':').next().unwrap_or(s).trim();
        Some(match code.parse::<u32>() {
            Ok(code) => Self::from_epsg(code),
            Err(_) => Self::named(s),
        })
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(EPSG_WGS84)
    }

    /// British National Grid (EPSG:27700)
    pub fn british_national_grid() -> Self {
        Self::from_epsg(EPSG_BRITISH_NATIONAL_GRID)
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Whether coordinates are angular (longitude/latitude) rather than planar.
    pub fn is_geographic(&self) -> bool {
        self.epsg == Some(EPSG_WGS84)
    }

    /// Same EPSG code, or the same name when neither has a code.
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        match (self.epsg, other.epsg) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.name.is_some() && self.name == other.name,
            _ => false,
        }
    }

    /// `EPSG:<code>`, or the (truncated) name.
    pub fn identifier(&self) -> String {
        match (self.epsg, &self.name) {
            (Some(code), _) => format!("EPSG:{}", code),
            (None, Some(name)) => name.chars().take(MAX_NAME_IN_IDENTIFIER).collect(),
            (None, None) => "Unknown".to_string(),
        }
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wgs84()
    }
}
