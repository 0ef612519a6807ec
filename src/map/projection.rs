//! Spherical Web-Mercator projection and slippy-map tile addressing.

use std::f64::consts::PI;

use crate::geo::LatLng;

pub const TILE_SIZE: f64 = 256.0;

/// Latitude beyond which Web-Mercator is undefined.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// A point in world pixel space at some zoom level. `x` grows east, `y` grows south.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: WorldPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom as i32)
}

/// Project a coordinate into world pixels. Longitudes outside -180..180 are
/// not wrapped so overlays drawn past the antimeridian stay continuous.
pub fn project(point: LatLng, zoom: u8) -> WorldPoint {
    let size = world_size(zoom);
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    WorldPoint::new(x, y)
}

pub fn unproject(point: WorldPoint, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let lng = point.x / size * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * point.y / size);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

/// A tile to draw, with its top-left corner relative to the viewport's top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub id: TileId,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Tiles covering a `width`×`height` viewport centered on `center`. Columns
/// wrap around the antimeridian; rows outside the world are dropped.
pub fn visible_tiles(center: LatLng, zoom: u8, width: f64, height: f64) -> Vec<PlacedTile> {
    let center_px = project(center, zoom);
    let left = center_px.x - width / 2.0;
    let top = center_px.y - height / 2.0;

    let tiles_per_axis = 2i64.pow(zoom as u32);
    let first_col = (left / TILE_SIZE).floor() as i64;
    let last_col = ((left + width) / TILE_SIZE).floor() as i64;
    let first_row = ((top / TILE_SIZE).floor() as i64).max(0);
    let last_row = (((top + height) / TILE_SIZE).floor() as i64).min(tiles_per_axis - 1);

    let mut tiles = Vec::new();
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            let wrapped = col.rem_euclid(tiles_per_axis);
            tiles.push(PlacedTile {
                id: TileId { zoom, x: wrapped as u32, y: row as u32 },
                offset_x: col as f64 * TILE_SIZE - left,
                offset_y: row as f64 * TILE_SIZE - top,
            });
        }
    }
    tiles
}

/// Distance from `p` to the segment `a`-`b`, in the same units as the inputs.
pub fn segment_distance(p: WorldPoint, a: WorldPoint, b: WorldPoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(WorldPoint::new(a.x + t * dx, a.y + t * dy))
}
