use geo_types::Coord;
use indexmap::IndexMap;

use super::AttributeValue;

/// One located observation: a site (location id) occupied in a group (year).
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Grouping key, e.g. breeding year
    pub group: i32,
    /// Location identifier, e.g. nest box code
    pub location_id: String,
    pub x: f64,
    pub y: f64,
    /// Remaining columns of the source row, in source order
    pub attributes: IndexMap<String, AttributeValue>,
}

impl PointRecord {
    pub fn new(group: i32, location_id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            group,
            location_id: location_id.into(),
            x,
            y,
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn coord(&self) -> Coord<f64> {
        Coord { x: self.x, y: self.y }
    }
}
