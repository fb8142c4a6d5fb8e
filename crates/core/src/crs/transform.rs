//! Pure-Rust reprojection from WGS84 into planar Transverse Mercator grids.
//!
//! Covers EPSG 326xx (UTM North), 327xx (UTM South) and 27700 (British National
//! Grid, via a 7-parameter Helmert shift to OSGB36). No external C dependencies
//! (no libproj).

use geo::{BoundingRect, Coord, Geometry, MapCoords};

use super::{CRS, EPSG_BRITISH_NATIONAL_GRID};
use crate::error::{Error, Result};

// ── Ellipsoids ───────────────────────────────────────────────────────────

/// Reference ellipsoid: semi-major axis (m) and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    pub const AIRY_1830: Ellipsoid = Ellipsoid {
        a: 6_377_563.396,
        f: (6_377_563.396 - 6_356_256.909) / 6_377_563.396,
    };

    /// First eccentricity squared
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }

    /// Second eccentricity squared
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }

    /// Meridional arc from equator to latitude `lat` (radians).
    /// Snyder eq. 3-21.
    fn meridional_arc(&self, lat: f64) -> f64 {
        let e2 = self.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
    }

    /// Geodetic (lon, lat, h) to earth-centred cartesian (x, y, z).
    fn to_cartesian(&self, lon: f64, lat: f64, h: f64) -> (f64, f64, f64) {
        let e2 = self.e2();
        let sin_lat = lat.sin();
        let nu = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        (
            (nu + h) * lat.cos() * lon.cos(),
            (nu + h) * lat.cos() * lon.sin(),
            ((1.0 - e2) * nu + h) * sin_lat,
        )
    }

    /// Earth-centred cartesian to geodetic (lon, lat) by fixed-point iteration.
    fn to_geodetic(&self, x: f64, y: f64, z: f64) -> (f64, f64) {
        let e2 = self.e2();
        let p = (x * x + y * y).sqrt();
        let mut lat = z.atan2(p * (1.0 - e2));
        for _ in 0..10 {
            let sin_lat = lat.sin();
            let nu = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            let next = (z + e2 * nu * sin_lat).atan2(p);
            if (next - lat).abs() < 1e-12 {
                lat = next;
                break;
            }
            lat = next;
        }
        (y.atan2(x), lat)
    }
}

// ── Transverse Mercator ──────────────────────────────────────────────────

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    pub ellipsoid: Ellipsoid,
    /// Central meridian (degrees)
    pub lon0: f64,
    /// Latitude of origin (degrees)
    pub lat0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl TransverseMercator {
    /// UTM zone on WGS84.
    pub fn utm(zone: u32, north: bool) -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            lon0: (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0,
            lat0: 0.0,
            k0: 0.9996,
            false_easting: 500_000.0,
            false_northing: if north { 0.0 } else { 10_000_000.0 },
        }
    }

    /// Ordnance Survey National Grid on Airy 1830 (expects OSGB36 lon/lat).
    pub fn british_national_grid() -> Self {
        Self {
            ellipsoid: Ellipsoid::AIRY_1830,
            lon0: -2.0,
            lat0: 49.0,
            k0: 0.999_601_271_7,
            false_easting: 400_000.0,
            false_northing: -100_000.0,
        }
    }

    /// Project (longitude, latitude) in degrees to (easting, northing) in metres.
    ///
    /// Snyder 1987, USGS Prof. Paper 1395, eqs. 8-9 and 8-10.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let ell = &self.ellipsoid;
        let e2 = ell.e2();
        let ep2 = ell.ep2();

        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        let lon0 = self.lon0.to_radians();

        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let tan_lat = lat.tan();

        let n = ell.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let t = tan_lat * tan_lat;
        let c = ep2 * cos_lat * cos_lat;
        let a_coeff = cos_lat * (lon - lon0);

        let m = ell.meridional_arc(lat);
        let m0 = ell.meridional_arc(self.lat0.to_radians());

        let a2 = a_coeff * a_coeff;
        let a4 = a2 * a2;
        let a6 = a4 * a2;

        let easting = self.k0
            * n
            * (a_coeff
                + (1.0 - t + c) * a2 * a_coeff / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a4 * a_coeff / 120.0)
            + self.false_easting;

        let northing = self.k0
            * (m - m0
                + n * tan_lat
                    * (a2 / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0))
            + self.false_northing;

        (easting, northing)
    }
}

// ── Datum shift ──────────────────────────────────────────────────────────

// WGS84 -> OSGB36 Helmert parameters (OS guide, Table 4).
const HELMERT_TX: f64 = -446.448;
const HELMERT_TY: f64 = 125.157;
const HELMERT_TZ: f64 = -542.060;
const HELMERT_S_PPM: f64 = 20.4894;
const HELMERT_RX_SEC: f64 = -0.1502;
const HELMERT_RY_SEC: f64 = -0.2470;
const HELMERT_RZ_SEC: f64 = -0.8421;

/// Shift WGS84 (lon, lat) in degrees onto the OSGB36 datum. Accurate to a few metres.
pub fn wgs84_to_osgb36(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let (x, y, z) = Ellipsoid::WGS84.to_cartesian(lon_deg.to_radians(), lat_deg.to_radians(), 0.0);

    let s = 1.0 + HELMERT_S_PPM * 1e-6;
    let rx = (HELMERT_RX_SEC / 3600.0).to_radians();
    let ry = (HELMERT_RY_SEC / 3600.0).to_radians();
    let rz = (HELMERT_RZ_SEC / 3600.0).to_radians();

    let x2 = HELMERT_TX + s * x - rz * y + ry * z;
    let y2 = HELMERT_TY + rz * x + s * y - rx * z;
    let z2 = HELMERT_TZ - ry * x + rx * y + s * z;

    let (lon, lat) = Ellipsoid::AIRY_1830.to_geodetic(x2, y2, z2);
    (lon.to_degrees(), lat.to_degrees())
}

/// Parse an EPSG code into UTM zone info: `Some((zone, is_north))`.
///
/// - EPSG 326xx → zone xx, North hemisphere
/// - EPSG 327xx → zone xx, South hemisphere
pub fn parse_utm_epsg(epsg: u32) -> Option<(u32, bool)> {
    if (32601..=32660).contains(&epsg) {
        Some((epsg - 32600, true))
    } else if (32701..=32760).contains(&epsg) {
        Some((epsg - 32700, false))
    } else {
        None
    }
}

/// Reject geographic input whose coordinates cannot be longitude/latitude.
fn check_degrees(geom: &Geometry<f64>, crs: &CRS) -> Result<()> {
    let Some(rect) = geom.bounding_rect() else {
        return Ok(());
    };
    let (min, max) = (rect.min(), rect.max());
    if min.x < -180.0 || max.x > 180.0 || min.y < -90.0 || max.y > 90.0 {
        return Err(Error::InvalidGeometry(format!(
            "extent ({:.1}, {:.1}) - ({:.1}, {:.1}) is not valid {} longitude/latitude; \
             the source is probably projected and lacks a declared CRS",
            min.x, min.y, max.x, max.y, crs
        )));
    }
    Ok(())
}

/// Reproject a geometry between two CRS.
///
/// Equivalent CRS return a copy unchanged. Supported transforms are WGS84 to any
/// UTM zone and WGS84 to the British National Grid; anything else is
/// [`Error::UnsupportedCrs`]. WGS84 input outside lon [-180, 180] or
/// lat [-90, 90] is [`Error::InvalidGeometry`].
pub fn reproject_geometry(geom: &Geometry<f64>, from: &CRS, to: &CRS) -> Result<Geometry<f64>> {
    if from.is_equivalent(to) {
        return Ok(geom.clone());
    }

    let unsupported = || Error::UnsupportedCrs {
        from: from.identifier(),
        to: to.identifier(),
    };

    if !from.is_geographic() {
        return Err(unsupported());
    }
    check_degrees(geom, from)?;

    match to.epsg() {
        Some(EPSG_BRITISH_NATIONAL_GRID) => {
            let tm = TransverseMercator::british_national_grid();
            Ok(geom.map_coords(|c| {
                let (lon, lat) = wgs84_to_osgb36(c.x, c.y);
                let (x, y) = tm.project(lon, lat);
                Coord { x, y }
            }))
        }
        Some(code) => {
            let (zone, north) = parse_utm_epsg(code).ok_or_else(unsupported)?;
            let tm = TransverseMercator::utm(zone, north);
            Ok(geom.map_coords(|c| {
                let (x, y) = tm.project(c.x, c.y);
                Coord { x, y }
            }))
        }
        None => Err(unsupported()),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    /// Helper: assert two values are within `tol` of each other.
    fn assert_close(a: f64, b: f64, tol: f64, msg: &str) {
        let diff = (a - b).abs();
        assert!(
            diff < tol,
            "{msg}: expected {b}, got {a}, diff {diff} exceeds tolerance {tol}"
        );
    }

    #[test]
    fn parse_utm_zones() {
        assert_eq!(parse_utm_epsg(32630), Some((30, true)));
        assert_eq!(parse_utm_epsg(32721), Some((21, false)));
        assert_eq!(parse_utm_epsg(4326), None);
        assert_eq!(parse_utm_epsg(32600), None);
        assert_eq!(parse_utm_epsg(32761), None);
    }

    // Madrid: pyproj 4326 -> 32630 gives (440298.94, 4474257.31)
    #[test]
    fn madrid_wgs84_to_utm30n() {
        let (e, n) = TransverseMercator::utm(30, true).project(-3.7037, 40.4168);
        assert_close(e, 440_298.94, 1.0, "easting");
        assert_close(n, 4_474_257.31, 1.0, "northing");
    }

    // Buenos Aires: pyproj 4326 -> 32721 gives (373317.50, 6170036.17)
    #[test]
    fn buenos_aires_wgs84_to_utm21s() {
        let (e, n) = TransverseMercator::utm(21, false).project(-58.3816, -34.6037);
        assert_close(e, 373_317.50, 1.0, "easting");
        assert_close(n, 6_170_036.17, 1.0, "northing");
    }

    // OS guide worked example (OSGB36 lat 52°39'27.2531"N, lon 1°43'4.5177"E)
    #[test]
    fn os_guide_national_grid_example() {
        let lat = 52.0 + 39.0 / 60.0 + 27.2531 / 3600.0;
        let lon = 1.0 + 43.0 / 60.0 + 4.5177 / 3600.0;
        let (e, n) = TransverseMercator::british_national_grid().project(lon, lat);
        assert_close(e, 651_409.903, 0.5, "easting");
        assert_close(n, 313_177.270, 0.5, "northing");
    }

    #[test]
    fn national_grid_true_origin() {
        let (e, n) = TransverseMercator::british_national_grid().project(-2.0, 49.0);
        assert_close(e, 400_000.0, 1e-6, "easting at true origin");
        assert_close(n, -100_000.0, 1e-6, "northing at true origin");
    }

    #[test]
    fn helmert_shift_is_small() {
        let (lon, lat) = wgs84_to_osgb36(-1.3375, 51.7727);
        // OSGB36 differs from WGS84 by roughly 100 m around Oxford
        assert!((lon - -1.3375).abs() > 1e-4 && (lon - -1.3375).abs() < 5e-3);
        assert!((lat - 51.7727).abs() < 5e-3);
    }

    #[test]
    fn reproject_wytham_to_national_grid() {
        let p = Geometry::Point(Point::new(-1.3375, 51.7727));
        let out = reproject_geometry(&p, &CRS::wgs84(), &CRS::british_national_grid()).unwrap();
        let Geometry::Point(q) = out else {
            panic!("expected point");
        };
        assert!(q.x() > 440_000.0 && q.x() < 452_000.0, "easting {}", q.x());
        assert!(q.y() > 203_000.0 && q.y() < 214_000.0, "northing {}", q.y());
    }

    #[test]
    fn reproject_same_crs_noop() {
        let p = Geometry::Point(Point::new(451_000.0, 206_000.0));
        let out = reproject_geometry(&p, &CRS::british_national_grid(), &CRS::from_epsg(27700)).unwrap();
        assert_eq!(out, p);
    }

    #[test]
    fn reproject_rejects_metres_labelled_as_degrees() {
        let p = Geometry::Point(Point::new(445_000.0, 207_000.0));
        let err = reproject_geometry(&p, &CRS::wgs84(), &CRS::british_national_grid());
        assert!(matches!(err, Err(Error::InvalidGeometry(_))));

        let edge = Geometry::Point(Point::new(180.0, -90.0));
        assert!(reproject_geometry(&edge, &CRS::wgs84(), &CRS::from_epsg(32601)).is_ok());
    }

    #[test]
    fn reproject_unsupported_pair() {
        let p = Geometry::Point(Point::new(0.0, 0.0));
        let err = reproject_geometry(&p, &CRS::from_epsg(3857), &CRS::british_national_grid());
        assert!(matches!(err, Err(Error::UnsupportedCrs { .. })));

        let err = reproject_geometry(&p, &CRS::wgs84(), &CRS::from_epsg(3857));
        assert!(matches!(err, Err(Error::UnsupportedCrs { .. })));
    }
}
