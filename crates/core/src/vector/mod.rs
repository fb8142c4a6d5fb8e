//! Vector data structures
//!
//! - Feature: geometry + ordered attributes
//! - FeatureCollection: collection of features with a CRS
//! - PointRecord: a grouped, located observation

mod points;

pub use points::PointRecord;

use geo_types::Geometry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::crs::CRS;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Infer a typed value from a text cell.
    ///
    /// Empty text is `Null`; integers, floats and `true`/`false` are typed;
    /// everything else stays a string.
    pub fn parse_cell(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return AttributeValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return AttributeValue::Int(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return AttributeValue::Float(f);
            }
        }
        match s.to_ascii_lowercase().as_str() {
            "true" => AttributeValue::Bool(true),
            "false" => AttributeValue::Bool(false),
            _ => AttributeValue::String(s.to_string()),
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert to a JSON value for GeoJSON properties.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeValue::Null => serde_json::Value::Null,
            AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
            AttributeValue::Int(i) => serde_json::Value::from(*i),
            AttributeValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            AttributeValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Convert from a JSON property value. Nested values are kept as JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::Bool(b) => AttributeValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Int(i),
                None => n.as_f64().map(AttributeValue::Float).unwrap_or(AttributeValue::Null),
            },
            serde_json::Value::String(s) => AttributeValue::String(s.clone()),
            other => AttributeValue::String(other.to_string()),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v as i64)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes, in insertion order
    pub properties: IndexMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: IndexMap::new(),
            id: None,
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: IndexMap::new(),
            id: None,
        }
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }
}

/// Collection of features sharing one CRS
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub crs: Option<CRS>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new(), crs: None }
    }

    pub fn with_crs(crs: CRS) -> Self {
        Self { features: Vec::new(), crs: Some(crs) }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    #[test]
    fn test_parse_cell_types() {
        assert_eq!(AttributeValue::parse_cell(""), AttributeValue::Null);
        assert_eq!(AttributeValue::parse_cell(" 12 "), AttributeValue::Int(12));
        assert_eq!(AttributeValue::parse_cell("1.5"), AttributeValue::Float(1.5));
        assert_eq!(AttributeValue::parse_cell("TRUE"), AttributeValue::Bool(true));
        assert_eq!(
            AttributeValue::parse_cell("great tit"),
            AttributeValue::String("great tit".into())
        );
        assert_eq!(AttributeValue::parse_cell("NaN"), AttributeValue::String("NaN".into()));
    }

    #[test]
    fn test_json_roundtrip_scalars() {
        for v in [
            AttributeValue::Null,
            AttributeValue::Bool(false),
            AttributeValue::Int(-3),
            AttributeValue::Float(0.25),
            AttributeValue::String("C12".into()),
        ] {
            assert_eq!(AttributeValue::from_json(&v.to_json()), v);
        }
    }

    #[test]
    fn test_feature_properties_keep_order() {
        let mut f = Feature::new(Geometry::Point(Point::new(1.0, 2.0)));
        f.set_property("year", 2021i64);
        f.set_property("box", "A1");
        f.set_property("area_m2", 10.0);
        let keys: Vec<&str> = f.properties.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["year", "box", "area_m2"]);
        assert_eq!(f.get_property("box"), Some(&AttributeValue::String("A1".into())));
    }
}
