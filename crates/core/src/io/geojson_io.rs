//! GeoJSON reading and writing
//!
//! The CRS of a layer travels in the legacy `crs` member
//! (`{"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::27700"}}`),
//! which is what GDAL reads and writes for projected GeoJSON.

use std::path::Path;

use geojson::{GeoJson, JsonObject, JsonValue};

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection};

/// Read a GeoJSON file (FeatureCollection, Feature or bare Geometry).
pub fn read_features(path: impl AsRef<Path>) -> Result<FeatureCollection> {
    let text = std::fs::read_to_string(path.as_ref())?;
    read_features_from_str(&text)
}

/// Parse GeoJSON text into a feature collection.
///
/// The collection's CRS is taken from the `crs` member when present, and left
/// unset otherwise (callers decide the default).
pub fn read_features_from_str(text: &str) -> Result<FeatureCollection> {
    let parsed: GeoJson = text.parse()?;

    let mut out = FeatureCollection::new();
    match parsed {
        GeoJson::FeatureCollection(fc) => {
            out.crs = fc.foreign_members.as_ref().and_then(crs_from_members);
            for f in fc.features {
                out.push(convert_feature(f)?);
            }
        }
        GeoJson::Feature(f) => {
            out.crs = f.foreign_members.as_ref().and_then(crs_from_members);
            out.push(convert_feature(f)?);
        }
        GeoJson::Geometry(g) => {
            out.crs = g.foreign_members.as_ref().and_then(crs_from_members);
            out.push(Feature::new(geo_types::Geometry::<f64>::try_from(g)?));
        }
    }
    Ok(out)
}

fn convert_feature(f: geojson::Feature) -> Result<Feature> {
    let mut feature = match f.geometry {
        Some(g) => Feature::new(geo_types::Geometry::<f64>::try_from(g)?),
        None => Feature::empty(),
    };
    feature.id = f.id.map(|id| match id {
        geojson::feature::Id::String(s) => s,
        geojson::feature::Id::Number(n) => n.to_string(),
    });
    if let Some(props) = f.properties {
        for (k, v) in props.iter() {
            feature.properties.insert(k.clone(), AttributeValue::from_json(v));
        }
    }
    Ok(feature)
}

fn crs_from_members(members: &JsonObject) -> Option<CRS> {
    let name = members
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()?;
    CRS::parse(name)
}

fn crs_member(crs: &CRS) -> Option<JsonObject> {
    let code = crs.epsg()?;
    let mut properties = JsonObject::new();
    properties.insert(
        "name".to_string(),
        JsonValue::String(format!("urn:ogc:def:crs:EPSG::{}", code)),
    );
    let mut crs_obj = JsonObject::new();
    crs_obj.insert("type".to_string(), JsonValue::String("name".to_string()));
    crs_obj.insert("properties".to_string(), JsonValue::Object(properties));

    let mut members = JsonObject::new();
    members.insert("crs".to_string(), JsonValue::Object(crs_obj));
    Some(members)
}

fn to_geojson(collection: &FeatureCollection) -> geojson::FeatureCollection {
    let features = collection
        .iter()
        .map(|f| {
            let properties: JsonObject = f
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect();
            geojson::Feature {
                bbox: None,
                geometry: f
                    .geometry
                    .as_ref()
                    .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
                id: f.id.clone().map(geojson::feature::Id::String),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: collection.crs.as_ref().and_then(crs_member),
    }
}

/// Serialize a collection as pretty-printed GeoJSON.
///
/// Output is deterministic for a given collection.
pub fn to_geojson_string(collection: &FeatureCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_geojson(collection))?)
}
