use serde::Deserialize;
use serde::Serialize;

use crate::geo::Bounds;
use crate::geo::LatLng;
use crate::map::projection::WorldPoint;
use crate::map::projection::project;
use crate::map::projection::unproject;

/// A center and zoom level pair, as stored in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub center: LatLng,
    pub zoom: u8,
}

impl View {
    pub const fn new(lat: f64, lng: f64, zoom: u8) -> Self {
        Self { center: LatLng::new(lat, lng), zoom }
    }
}

/// Where the map is looking. Zoom is kept within `min_zoom..=max_zoom` and the
/// center within `max_extent` after every change.
#[derive(Debug, Clone)]
pub struct Viewport {
    center: LatLng,
    zoom: u8,
    min_zoom: u8,
    max_zoom: u8,
    max_extent: Bounds,
}

impl Viewport {
    pub fn new(initial: View, min_zoom: u8, max_zoom: u8, max_extent: Bounds) -> Self {
        let mut viewport = Self { center: initial.center, zoom: initial.zoom, min_zoom, max_zoom: max_zoom.max(min_zoom), max_extent };
        viewport.set_view(initial.center, initial.zoom);
        viewport
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    pub fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.center = self.max_extent.clamp(center);
    }

    pub fn reset_to(&mut self, view: View) {
        self.set_view(view.center, view.zoom);
    }

    pub fn set_zoom(&mut self, zoom: i32) {
        let zoom = zoom.clamp(self.min_zoom as i32, self.max_zoom as i32) as u8;
        self.set_view(self.center, zoom);
    }

    /// Change zoom by `delta` levels, keeping the geographic point under
    /// `anchor` (screen offset from the viewport center) fixed.
    pub fn zoom_around(&mut self, delta: i32, anchor: (f64, f64)) {
        let target = (self.zoom as i32 + delta).clamp(self.min_zoom as i32, self.max_zoom as i32) as u8;
        if target == self.zoom {
            return;
        }

        let fixed = self.offset_to_latlng(anchor);
        let fixed_px = project(fixed, target);
        let center_px = WorldPoint::new(fixed_px.x - anchor.0, fixed_px.y - anchor.1);
        self.set_view(unproject(center_px, target), target);
    }

    /// Move the view by a screen-space drag of `(dx, dy)` pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let center_px = project(self.center, self.zoom);
        let moved = WorldPoint::new(center_px.x - dx, center_px.y - dy);
        self.set_view(unproject(moved, self.zoom), self.zoom);
    }

    /// Largest zoom at which `bounds` fits a `width`×`height` viewport.
    pub fn bounds_zoom(&self, bounds: &Bounds, width: f64, height: f64) -> u8 {
        let mut zoom = self.max_zoom;
        while zoom > self.min_zoom {
            let sw = project(bounds.south_west, zoom);
            let ne = project(bounds.north_east, zoom);
            if (ne.x - sw.x).abs() <= width && (sw.y - ne.y).abs() <= height {
                break;
            }
            zoom -= 1;
        }
        zoom
    }

    /// Center on `bounds` at the largest zoom that shows all of it.
    pub fn fit_bounds(&mut self, bounds: &Bounds, width: f64, height: f64) {
        let zoom = self.bounds_zoom(bounds, width, height);
        let sw = project(bounds.south_west, zoom);
        let ne = project(bounds.north_east, zoom);
        let middle = WorldPoint::new((sw.x + ne.x) / 2.0, (sw.y + ne.y) / 2.0);
        self.set_view(unproject(middle, zoom), zoom);
    }

    /// Screen offset of `point` from the viewport center, in pixels.
    pub fn latlng_to_offset(&self, point: LatLng) -> (f64, f64) {
        let center_px = project(self.center, self.zoom);
        let px = project(point, self.zoom);
        (px.x - center_px.x, px.y - center_px.y)
    }

    pub fn offset_to_latlng(&self, offset: (f64, f64)) -> LatLng {
        let center_px = project(self.center, self.zoom);
        unproject(WorldPoint::new(center_px.x + offset.0, center_px.y + offset.1), self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> Bounds {
        Bounds::new(LatLng::new(-85.0, -300.0), LatLng::new(85.0, 300.0))
    }

    #[test]
    fn zoom_is_clamped_to_range() {
        let mut viewport = Viewport::new(View::new(40.0, 0.0, 1), 3, 10, extent());
        assert_eq!(viewport.zoom(), 3);
        viewport.set_zoom(42);
        assert_eq!(viewport.zoom(), 10);
        viewport.set_zoom(-7);
        assert_eq!(viewport.zoom(), 3);
    }

    #[test]
    fn center_is_clamped_to_extent() {
        let mut viewport = Viewport::new(View::new(40.0, 0.0, 3), 3, 10, extent());
        viewport.set_view(LatLng::new(89.0, -350.0), 5);
        assert_eq!(viewport.center(), LatLng::new(85.0, -300.0));
    }

    #[test]
    fn fit_bounds_then_widen_stays_in_range() {
        let mut viewport = Viewport::new(View::new(40.0, 0.0, 3), 3, 10, extent());
        let bounds = Bounds::new(LatLng::new(46.0, 6.0), LatLng::new(46.1, 6.1));
        viewport.fit_bounds(&bounds, 800.0, 600.0);
        let fitted = viewport.zoom();
        assert_eq!(fitted, 10);
        assert!((viewport.center().lat - 46.05).abs() < 0.01);

        viewport.set_zoom(fitted as i32 - 3);
        assert_eq!(viewport.zoom(), 7);

        viewport.set_zoom(viewport.min_zoom() as i32 - 3);
        assert_eq!(viewport.zoom(), 3);
    }

    #[test]
    fn fit_bounds_picks_smaller_zoom_for_large_area() {
        let viewport = Viewport::new(View::new(40.0, 0.0, 3), 3, 10, extent());
        let small = Bounds::new(LatLng::new(46.0, 6.0), LatLng::new(46.1, 6.1));
        let large = Bounds::new(LatLng::new(30.0, -20.0), LatLng::new(50.0, 10.0));
        assert!(viewport.bounds_zoom(&large, 800.0, 600.0) < viewport.bounds_zoom(&small, 800.0, 600.0));
    }

    #[test]
    fn offsets_round_trip_through_center() {
        let viewport = Viewport::new(View::new(40.0, 0.0, 5), 3, 10, extent());
        let point = viewport.offset_to_latlng((120.0, -45.0));
        let (x, y) = viewport.latlng_to_offset(point);
        assert!((x - 120.0).abs() < 1e-6);
        assert!((y + 45.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_around_keeps_anchor_fixed() {
        let mut viewport = Viewport::new(View::new(40.0, 0.0, 5), 3, 10, extent());
        let anchor = (100.0, 50.0);
        let before = viewport.offset_to_latlng(anchor);
        viewport.zoom_around(1, anchor);
        assert_eq!(viewport.zoom(), 6);
        let after = viewport.offset_to_latlng(anchor);
        assert!((before.lat - after.lat).abs() < 1e-6);
        assert!((before.lng - after.lng).abs() < 1e-6);
    }

    #[test]
    fn pan_moves_center_against_drag() {
        let mut viewport = Viewport::new(View::new(0.0, 0.0, 5), 3, 10, extent());
        viewport.pan_by(100.0, 0.0);
        assert!(viewport.center().lng < 0.0);
    }
}
