//! Input normalization
//!
//! Turns a raw point table into typed [`PointRecord`]s and a boundary source
//! into one [`MultiPolygon`] in the canonical CRS.

use std::collections::{BTreeMap, HashSet};

use geo::{BooleanOps, Geometry, MultiPolygon};
use thiessen_core::crs::reproject_geometry;
use thiessen_core::io::RawTable;
use thiessen_core::{AttributeValue, Error, FeatureCollection, PointRecord, Result, CRS};

use crate::config::ColumnConfig;

/// Row accounting for one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows: usize,
    pub kept: usize,
    /// Missing or unparseable X/Y
    pub bad_coordinates: usize,
    /// Missing or non-integral group key
    pub bad_group: usize,
    pub missing_location: usize,
    /// Later rows repeating a (group, location) pair
    pub duplicates: usize,
}

impl NormalizeReport {
    pub fn excluded(&self) -> usize {
        self.rows - self.kept
    }
}

/// Typed point records plus how they were obtained.
#[derive(Debug, Clone, Default)]
pub struct NormalizedPoints {
    /// Kept rows in source order
    pub records: Vec<PointRecord>,
    pub report: NormalizeReport,
}

impl NormalizedPoints {
    /// Records split by group key, ascending.
    pub fn by_group(&self) -> BTreeMap<i32, Vec<PointRecord>> {
        let mut groups: BTreeMap<i32, Vec<PointRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.group).or_default().push(record.clone());
        }
        groups
    }
}

/// Parse a group key: integer text, or a float with no fractional part.
pub fn parse_group_key(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i32>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize a point table.
///
/// Missing required columns are an error; bad rows are excluded and counted.
/// Columns other than the four required ones become attributes in source order.
pub fn normalize_points(table: &RawTable, columns: &ColumnConfig) -> Result<NormalizedPoints> {
    let group_idx = table.column_index(&columns.group)?;
    let location_idx = table.column_index(&columns.location)?;
    let x_idx = table.column_index(&columns.x)?;
    let y_idx = table.column_index(&columns.y)?;
    let required = [group_idx, location_idx, x_idx, y_idx];

    let extra: Vec<(usize, &str)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !required.contains(i))
        .map(|(i, h)| (i, h.as_str()))
        .collect();

    let mut report = NormalizeReport {
        rows: table.len(),
        ..NormalizeReport::default()
    };
    let mut seen: HashSet<(i32, String)> = HashSet::new();
    let mut records = Vec::with_capacity(table.len());

    for row in &table.rows {
        let (Some(x), Some(y)) = (parse_coordinate(&row[x_idx]), parse_coordinate(&row[y_idx])) else {
            report.bad_coordinates += 1;
            continue;
        };
        let Some(group) = parse_group_key(&row[group_idx]) else {
            report.bad_group += 1;
            continue;
        };
        let location = location_id(&row[location_idx]);
        if location.is_empty() {
            report.missing_location += 1;
            continue;
        }
        if !seen.insert((group, location.clone())) {
            report.duplicates += 1;
            continue;
        }

        let mut record = PointRecord::new(group, location, x, y);
        for &(i, name) in &extra {
            record.attributes.insert(name.to_string(), AttributeValue::parse_cell(&row[i]));
        }
        records.push(record);
    }

    report.kept = records.len();
    tracing::debug!(
        "Normalized {} rows: kept {}, bad coordinates {}, bad group {}, missing location {}, duplicates {}",
        report.rows,
        report.kept,
        report.bad_coordinates,
        report.bad_group,
        report.missing_location,
        report.duplicates
    );

    Ok(NormalizedPoints { records, report })
}

/// Location ids are strings; integral floats lose their `.0` so that `"12.0"`
/// and `"12"` name the same box.
fn location_id(raw: &str) -> String {
    let s = raw.trim();
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && s.contains('.') && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => s.to_string(),
    }
}

/// Union the polygonal members of a boundary source and bring them into the
/// canonical CRS.
///
/// A source without a declared CRS is taken to be in `default_crs`.
pub fn normalize_boundary(
    source: &FeatureCollection,
    default_crs: &CRS,
    canonical: &CRS,
) -> Result<MultiPolygon<f64>> {
    let from = source.crs.clone().unwrap_or_else(|| default_crs.clone());

    let mut boundary = MultiPolygon::new(vec![]);
    let mut members = 0usize;
    for feature in source.iter() {
        let Some(geometry) = &feature.geometry else { continue };
        let projected = reproject_geometry(geometry, &from, canonical)?;
        for polygon in polygons_of(projected) {
            boundary = boundary.union(&polygon);
            members += 1;
        }
    }

    if boundary.0.is_empty() {
        return Err(Error::InvalidGeometry("boundary has no polygon with area".into()));
    }
    tracing::debug!(
        "Boundary: {} polygon members -> {} parts ({} -> {})",
        members,
        boundary.0.len(),
        from,
        canonical
    );
    Ok(boundary)
}

fn polygons_of(geometry: Geometry<f64>) -> Vec<geo::Polygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(mp) => mp.0,
        Geometry::Rect(r) => vec![r.to_polygon()],
        Geometry::Triangle(t) => vec![t.to_polygon()],
        Geometry::GeometryCollection(gc) => gc.0.into_iter().flat_map(polygons_of).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area, Point};
    use thiessen_core::Feature;

    fn table(text: &str) -> RawTable {
        RawTable::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_group_key() {
        assert_eq!(parse_group_key("2021"), Some(2021));
        assert_eq!(parse_group_key(" 2021.0 "), Some(2021));
        assert_eq!(parse_group_key("2021.5"), None);
        assert_eq!(parse_group_key(""), None);
        assert_eq!(parse_group_key("twenty"), None);
        assert_eq!(parse_group_key("1e20"), None);
    }

    #[test]
    fn test_normalize_points() {
        let t = table(
            "year,box,x,y,species,clutch\n\
             2021,A1,100,500,great tit,8\n\
             2021.0,B2,900,500,blue tit,\n\
             2021,A1,300,300,great tit,9\n\
             2022,A1,,500,great tit,7\n\
             ,C3,1,2,great tit,7\n\
             2022,C3,1,2,,\n",
        );
        let out = normalize_points(&t, &ColumnConfig::default()).unwrap();

        assert_eq!(out.report.rows, 6);
        assert_eq!(out.report.kept, 3);
        assert_eq!(out.report.duplicates, 1);
        assert_eq!(out.report.bad_coordinates, 1);
        assert_eq!(out.report.bad_group, 1);
        assert_eq!(out.report.excluded(), 3);

        let first = &out.records[0];
        assert_eq!((first.group, first.location_id.as_str()), (2021, "A1"));
        assert_eq!((first.x, first.y), (100.0, 500.0));
        let keys: Vec<&str> = first.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["species", "clutch"]);
        assert_eq!(first.attributes["clutch"], AttributeValue::Int(8));
        assert_eq!(out.records[1].attributes["clutch"], AttributeValue::Null);

        let groups = out.by_group();
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![2021, 2022]);
        assert_eq!(groups[&2021].len(), 2);
    }

    #[test]
    fn test_missing_column() {
        let t = table("Year,Nestbox,x,y\n2021,A1,1,2\n");
        match normalize_points(&t, &ColumnConfig::default()) {
            Err(Error::MissingColumn { name, available }) => {
                assert_eq!(name, "year");
                assert_eq!(available, vec!["Year", "Nestbox", "x", "y"]);
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_location_ids() {
        let t = table("year,box,x,y\n2021,12.0,1,2\n2021,12,3,4\n2021,007,5,6\n");
        let out = normalize_points(&t, &ColumnConfig::default()).unwrap();
        assert_eq!(out.report.duplicates, 1);
        assert_eq!(out.records[0].location_id, "12");
        assert_eq!(out.records[1].location_id, "007");
    }

    fn square(x0: f64, y0: f64, size: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x0, y: y0), (x: x0 + size, y: y0), (x: x0 + size, y: y0 + size), (x: x0, y: y0 + size)
        ])
    }

    #[test]
    fn test_boundary_union_in_canonical_crs() {
        let mut fc = FeatureCollection::with_crs(CRS::british_national_grid());
        fc.push(Feature::new(square(0.0, 0.0, 1000.0)));
        fc.push(Feature::new(square(500.0, 0.0, 1000.0)));
        fc.push(Feature::new(Geometry::Point(Point::new(5.0, 5.0))));

        let b = normalize_boundary(&fc, &CRS::wgs84(), &CRS::british_national_grid()).unwrap();
        assert_eq!(b.0.len(), 1);
        assert!((b.unsigned_area() - 1_500_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_reprojected_from_default_crs() {
        // Roughly Wytham Woods, in degrees
        let mut fc = FeatureCollection::new();
        fc.push(Feature::new(Geometry::Polygon(polygon![
            (x: -1.34, y: 51.76), (x: -1.31, y: 51.76), (x: -1.31, y: 51.78), (x: -1.34, y: 51.78)
        ])));

        let b = normalize_boundary(&fc, &CRS::wgs84(), &CRS::british_national_grid()).unwrap();
        let area_ha = b.unsigned_area() / 10_000.0;
        // 0.03 deg lon x 0.02 deg lat at 51.77 N is about 2.07 km x 2.22 km
        assert!(area_ha > 400.0 && area_ha < 500.0, "area {} ha", area_ha);
    }

    #[test]
    fn test_projected_boundary_without_crs_is_rejected() {
        // National Grid metres, exported without a crs member
        let mut fc = FeatureCollection::new();
        fc.push(Feature::new(square(445_000.0, 207_000.0, 3000.0)));

        match normalize_boundary(&fc, &CRS::wgs84(), &CRS::british_national_grid()) {
            Err(Error::InvalidGeometry(msg)) => assert!(msg.contains("longitude/latitude"), "{}", msg),
            other => panic!("expected InvalidGeometry, got {:?}", other),
        }

        // Declaring the default CRS correctly makes the same file usable
        let b = normalize_boundary(&fc, &CRS::british_national_grid(), &CRS::british_national_grid()).unwrap();
        assert!((b.unsigned_area() - 9_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_boundary_errors() {
        let mut points_only = FeatureCollection::with_crs(CRS::british_national_grid());
        points_only.push(Feature::new(Geometry::Point(Point::new(1.0, 1.0))));
        assert!(matches!(
            normalize_boundary(&points_only, &CRS::wgs84(), &CRS::british_national_grid()),
            Err(Error::InvalidGeometry(_))
        ));

        let mut utm = FeatureCollection::with_crs(CRS::from_epsg(32630));
        utm.push(Feature::new(square(0.0, 0.0, 10.0)));
        assert!(matches!(
            normalize_boundary(&utm, &CRS::wgs84(), &CRS::british_national_grid()),
            Err(Error::UnsupportedCrs { .. })
        ));
    }
}
