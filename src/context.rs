//! Application state owned by the UI thread.

use std::time::Instant;

use jiff::tz::TimeZone;
use tracing::debug;

use crate::api::UploadRequest;
use crate::error::ViewerError;
use crate::events::ViewerEvent;
use crate::geo::LatLng;
use crate::lightbox::Lightbox;
use crate::live::LiveTrack;
use crate::live::LiveUpdate;
use crate::map::LayerVisibility;
use crate::map::Viewport;
use crate::media::MediaLayer;
use crate::media_form::MediaForm;
use crate::settings::ViewerConfig;
use crate::track::Track;

/// Map size assumed until the map has been laid out once.
const DEFAULT_MAP_SIZE: (f64, f64) = (1024.0, 700.0);

/// What an open map popup is attached to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopupTarget {
    Track(usize),
    Media(usize),
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPopup {
    pub at: LatLng,
    pub target: PopupTarget,
}

/// Everything the viewer shows. Built map first, then layers and overlay
/// groups, then the components that fill them.
pub struct AppContext {
    pub config: ViewerConfig,
    pub viewport: Viewport,
    pub layers: LayerVisibility,
    pub tracks: Vec<Track>,
    pub media: MediaLayer,
    pub live: LiveTrack,
    pub form: MediaForm,
    pub lightbox: Lightbox,
    pub popup: Option<MapPopup>,
    pub time_zone: TimeZone,
    map_size: (f64, f64),
}

impl AppContext {
    pub fn new(config: ViewerConfig) -> Self {
        let viewport = Viewport::new(config.initial_view, config.min_zoom, config.max_zoom, ViewerConfig::MAX_EXTENT);
        let layers = LayerVisibility::default();
        let tracks = Vec::with_capacity(config.tracks.len());
        let media = MediaLayer::default();
        let live = LiveTrack::default();
        let form = MediaForm::new(config.confirmation_delay());

        Self {
            config,
            viewport,
            layers,
            tracks,
            media,
            live,
            form,
            lightbox: Lightbox::default(),
            popup: None,
            time_zone: TimeZone::system(),
            map_size: DEFAULT_MAP_SIZE,
        }
    }

    pub fn set_map_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.map_size = (width, height);
        }
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset_to(self.config.default_view);
    }

    pub fn handle_event(&mut self, event: ViewerEvent, now: Instant) {
        match event {
            ViewerEvent::TrackLoaded(track) => self.add_track(track),
            ViewerEvent::LocationSelected { track, at } => {
                debug!("location selected on {:?} at {:?}", track, at);
                self.form.open(&track, at);
            }
            ViewerEvent::MediaListed(records) => {
                for record in &records {
                    self.media.add_record(record, &self.config.api_base);
                }
            }
            ViewerEvent::UploadFinished(result) => {
                if let Some(record) = self.form.finish_upload(result, now) {
                    self.media.add_record(&record, &self.config.api_base);
                }
            }
            ViewerEvent::LivePoints(points) => {
                if let LiveUpdate::FirstFix(at) = self.live.apply(&points) {
                    self.viewport.set_view(at, self.config.live_zoom);
                }
            }
        }
    }

    /// Validate the media form; the returned request still has to be sent.
    pub fn submit_form(&mut self) -> Result<UploadRequest, ViewerError> {
        self.form.submit()
    }

    fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
        if self.tracks.len() == 1 {
            let bounds = *self.tracks[0].bounds();
            let (width, height) = self.map_size;
            self.viewport.fit_bounds(&bounds, width, height);
            self.viewport.set_zoom(self.viewport.zoom() as i32 + self.config.fit_zoom_offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::LivePoint;

    fn context() -> AppContext {
        AppContext::new(ViewerConfig::default())
    }

    #[test]
    fn starts_at_initial_view() {
        let ctx = context();
        assert_eq!(ctx.viewport.center(), LatLng::new(40.0, 0.0));
        assert_eq!(ctx.viewport.zoom(), 3);
        assert!(ctx.tracks.is_empty() && ctx.media.is_empty());
    }

    #[test]
    fn first_track_fits_view_and_widens() {
        let mut ctx = context();
        let gpx = r#"<gpx><trk><trkseg><trkpt lat="46.0" lon="6.0"/><trkpt lat="46.1" lon="6.1"/></trkseg></trk></gpx>"#;
        ctx.handle_event(ViewerEvent::TrackLoaded(Track::from_gpx("A", "a.gpx", gpx).unwrap()), Instant::now());
        assert_eq!(ctx.viewport.zoom(), 7);
        assert!((ctx.viewport.center().lat - 46.05).abs() < 0.01);

        ctx.viewport.set_view(LatLng::new(0.0, 0.0), 4);
        let other = r#"<gpx><trk><trkseg><trkpt lat="10" lon="10"/></trkseg></trk></gpx>"#;
        ctx.handle_event(ViewerEvent::TrackLoaded(Track::from_gpx("B", "b.gpx", other).unwrap()), Instant::now());
        assert_eq!(ctx.tracks.len(), 2);
        assert_eq!(ctx.viewport.zoom(), 4);
    }

    #[test]
    fn reset_view_goes_to_default() {
        let mut ctx = context();
        ctx.viewport.set_view(LatLng::new(10.0, 10.0), 9);
        ctx.reset_view();
        assert_eq!(ctx.viewport.center(), LatLng::new(40.0, 0.0));
        assert_eq!(ctx.viewport.zoom(), 5);
    }

    #[test]
    fn live_recenters_only_once() {
        let mut ctx = context();
        let batch = |coords: &[(f64, f64)]| coords.iter().map(|&(lat, lng)| LivePoint { lat, lng, time: None }).collect::<Vec<_>>();

        ctx.handle_event(ViewerEvent::LivePoints(batch(&[(1.0, 2.0), (3.0, 4.0)])), Instant::now());
        assert_eq!(ctx.viewport.center(), LatLng::new(3.0, 4.0));

        ctx.viewport.set_view(LatLng::new(40.0, 0.0), 6);
        ctx.handle_event(ViewerEvent::LivePoints(batch(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)])), Instant::now());
        assert_eq!(ctx.live.marker(), Some(LatLng::new(5.0, 6.0)));
        assert_eq!(ctx.viewport.center(), LatLng::new(40.0, 0.0));
        assert_eq!(ctx.viewport.zoom(), 6);
    }
}
