//! Geographic primitives shared by tracks, media and the live feed.

use serde::Deserialize;
use serde::Serialize;

/// Mean Earth radius in meters, as used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && (-90.0..=90.0).contains(&self.lat)
    }

}

/// Axis-aligned geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub const fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self { south_west, north_east }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds::new(*first, *first);
        for point in &points[1..] {
            bounds.extend(*point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    /// Clamp `point` so it lies inside the box.
    pub fn clamp(&self, point: LatLng) -> LatLng {
        LatLng::new(
            point.lat.clamp(self.south_west.lat, self.north_east.lat),
            point.lng.clamp(self.south_west.lng, self.north_east.lng),
        )
    }
}

/// Haversine distance between two coordinates, in meters.
pub fn haversine_distance(a: &LatLng, b: &LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Cumulative length of a polyline, in meters.
pub fn path_distance(points: &[LatLng]) -> f64 {
    points.windows(2).map(|pair| haversine_distance(&pair[0], &pair[1])).sum()
}
