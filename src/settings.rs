use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::error::ViewerError;
use crate::geo::Bounds;
use crate::geo::LatLng;
use crate::map::View;

/// Name of the optional configuration file read from the working directory.
pub const CONFIG_FILE_NAME: &str = "trace_viewer.toml";

/// A static track file and the name it is shown under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSource {
    pub name: String,
    pub path: String,
}

impl TrackSource {
    pub fn new(name: &str, path: &str) -> Self {
        Self { name: name.to_string(), path: path.to_string() }
    }

    pub fn is_remote(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }
}

fn default_tracks() -> Vec<TrackSource> {
    vec![
        TrackSource::new("Activity 1", "data/activity_20969223596.gpx"),
        TrackSource::new("Activity 2", "data/activity_21024257057.gpx"),
        TrackSource::new("Activity 3", "data/activity_21040882598.gpx"),
        TrackSource::new("Activity 4", "data/activity_21140677371.gpx"),
        TrackSource::new("Activity 5", "data/activity_21140677789.gpx"),
    ]
}

/// Viewer configuration. Every field has a default so a partial file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Origin of the tracking API, without a trailing slash.
    pub api_base: String,
    pub live_track_id: String,
    pub poll_interval_secs: u64,
    /// How long "Média enregistré" stays visible before the form closes.
    pub confirmation_delay_ms: u64,
    /// Applied after fitting the first loaded track, to show some context.
    pub fit_zoom_offset: i32,
    /// Zoom used when centering on the first live fix.
    pub live_zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub initial_view: View,
    /// Target of the reset-view button.
    pub default_view: View,
    pub tracks: Vec<TrackSource>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_base: "https://benjamin-tracking.onrender.com".to_string(),
            live_track_id: "live".to_string(),
            poll_interval_secs: 10,
            confirmation_delay_ms: 800,
            fit_zoom_offset: -3,
            live_zoom: 3,
            min_zoom: 3,
            max_zoom: 10,
            initial_view: View::new(40.0, 0.0, 3),
            default_view: View::new(40.0, 0.0, 5),
            tracks: default_tracks(),
        }
    }
}

impl ViewerConfig {
    /// Panning is limited to this box so the world cannot be dragged away.
    pub const MAX_EXTENT: Bounds = Bounds::new(LatLng::new(-85.0, -300.0), LatLng::new(85.0, 300.0));

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }

    pub fn from_toml(text: &str) -> Result<Self, ViewerError> {
        Ok(toml::from_str(text)?)
    }

    /// Read `path` if it exists. A missing file means defaults; a broken one
    /// is logged and also falls back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config at {:?}, using defaults", path);
                return Self::default();
            }
            Err(e) => {
                warn!("could not read config {:?}: {}", path, ViewerError::from(e));
                return Self::default();
            }
        };

        match Self::from_toml(&text) {
            Ok(config) => {
                debug!("loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("ignoring config {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}
