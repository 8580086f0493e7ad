//! Mapping between geographic coordinates and the normalized routing plane.
//!
//! Every node position and every caller-supplied query point lives in the
//! normalized plane `[0, 100] x [0, 100]`. The longer side of the loaded map
//! spans the full range and the shorter side is scaled by the same factor, so
//! the aspect ratio is preserved and a single `metric_scale` converts any
//! normalized distance back into metres.

use serde::Serialize;

/// Mean Earth radius in metres (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Upper bound of both axes in the normalized plane.
pub const PLANE_EXTENT: f64 = 100.0;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and within `[-90, 90]` latitude and `[-180, 180]` longitude.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Geographic bounding box of the loaded map data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        points.into_iter().fold(None, |bounds, point| {
            Some(match bounds {
                None => Self {
                    min_lat: point.lat,
                    min_lon: point.lon,
                    max_lat: point.lat,
                    max_lon: point.lon,
                },
                Some(bounds) => bounds.including(point),
            })
        })
    }

    /// Grow the box so it contains `point`.
    pub fn including(self, point: GeoPoint) -> Self {
        Self {
            min_lat: self.min_lat.min(point.lat),
            min_lon: self.min_lon.min(point.lon),
            max_lat: self.max_lat.max(point.lat),
            max_lon: self.max_lon.max(point.lon),
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(self, other: Self) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lat: self.max_lat.max(other.max_lat),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }
}

/// Point in the normalized plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position, in normalized units.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub(crate) fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// Local equirectangular projection from a geographic box into the normalized plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    origin: GeoPoint,
    metres_per_degree_lat: f64,
    metres_per_degree_lon: f64,
    metric_scale: f64,
}

impl Projection {
    /// Identity projection used for synthetic graphs: positions are given directly in
    /// the normalized plane and one normalized unit equals one metre.
    pub fn unit() -> Self {
        Self {
            origin: GeoPoint::new(0.0, 0.0),
            metres_per_degree_lat: 1.0,
            metres_per_degree_lon: 1.0,
            metric_scale: 1.0,
        }
    }

    /// Build a projection so that `bounds` maps onto the normalized plane.
    pub fn from_bounds(bounds: GeoBounds) -> Self {
        let mean_lat = ((bounds.min_lat + bounds.max_lat) / 2.0).to_radians();
        let metres_per_degree_lat = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        let metres_per_degree_lon = metres_per_degree_lat * mean_lat.cos();

        let width = (bounds.max_lon - bounds.min_lon) * metres_per_degree_lon;
        let height = (bounds.max_lat - bounds.min_lat) * metres_per_degree_lat;
        let metric_scale = width.max(height) / PLANE_EXTENT;
        // A single point or a degenerate strip has no extent to normalize against.
        let metric_scale = if metric_scale.is_finite() && metric_scale > 0.0 {
            metric_scale
        } else {
            1.0
        };

        Self {
            origin: GeoPoint::new(bounds.min_lat, bounds.min_lon),
            metres_per_degree_lat,
            metres_per_degree_lon,
            metric_scale,
        }
    }

    /// Metres represented by one normalized unit.
    pub fn metric_scale(&self) -> f64 {
        self.metric_scale
    }

    /// Project a geographic point into the normalized plane.
    pub fn project(&self, point: GeoPoint) -> Position {
        let east = (point.lon - self.origin.lon) * self.metres_per_degree_lon;
        let north = (point.lat - self.origin.lat) * self.metres_per_degree_lat;
        Position {
            x: clamp_to_plane(east / self.metric_scale),
            y: clamp_to_plane(north / self.metric_scale),
        }
    }

    /// Convert a normalized-plane distance into metres.
    pub fn to_physical(&self, normalized: f64) -> f64 {
        normalized * self.metric_scale
    }
}

fn clamp_to_plane(value: f64) -> f64 {
    value.clamp(0.0, PLANE_EXTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bounds() -> GeoBounds {
        GeoBounds {
            min_lat: 51.50,
            min_lon: -0.13,
            max_lat: 51.51,
            max_lon: -0.11,
        }
    }

    #[test]
    fn invalid_coordinates_are_detected() {
        assert!(GeoPoint::new(51.5, -0.12).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
        assert!(!GeoPoint::new(1000.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn longer_side_spans_full_plane() {
        let projection = Projection::from_bounds(sample_bounds());
        let north_east = projection.project(GeoPoint::new(51.51, -0.11));
        let south_west = projection.project(GeoPoint::new(51.50, -0.13));

        assert_eq!(south_west, Position::new(0.0, 0.0));
        // At ~51.5N two hundredths of a degree of longitude is wider than one
        // hundredth of latitude is tall.
        assert!((north_east.x - PLANE_EXTENT).abs() < 1e-9);
        assert!(north_east.y < PLANE_EXTENT);
        assert!(north_east.y > 0.0);
    }

    #[test]
    fn physical_distance_matches_ground_distance() {
        let projection = Projection::from_bounds(sample_bounds());
        let a = projection.project(GeoPoint::new(51.500, -0.12));
        let b = projection.project(GeoPoint::new(51.505, -0.12));

        let metres = projection.to_physical(a.distance_to(&b));
        // 0.005 degrees of latitude is roughly 556 metres.
        assert!((metres - 555.97).abs() < 1.0, "got {metres}");
    }

    #[test]
    fn degenerate_bounds_fall_back_to_unit_scale() {
        let point = GeoPoint::new(10.0, 20.0);
        let bounds = GeoBounds::from_points([point]).expect("one point");
        let projection = Projection::from_bounds(bounds);

        assert_eq!(projection.metric_scale(), 1.0);
        assert_eq!(projection.project(point), Position::new(0.0, 0.0));
    }

    #[test]
    fn bounds_grow_to_cover_points() {
        let bounds = GeoBounds::from_points([
            GeoPoint::new(1.0, 5.0),
            GeoPoint::new(-2.0, 7.0),
            GeoPoint::new(0.5, 4.0),
        ])
        .expect("non-empty");

        assert_eq!(
            bounds,
            GeoBounds {
                min_lat: -2.0,
                min_lon: 4.0,
                max_lat: 1.0,
                max_lon: 7.0,
            }
        );
        assert!(GeoBounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn unit_projection_is_identity_scale() {
        let projection = Projection::unit();
        assert_eq!(projection.to_physical(14.5), 14.5);
    }
}
