//! The live position feed: its rendered state and the periodic poller.

use std::future::Future;
use std::time::Duration;

use jiff::Timestamp;
use serde::Deserialize;
use serde::Deserializer;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::geo::LatLng;
use crate::track::parse_timestamp;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LivePoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub time: Option<Timestamp>,
}

/// The server stamps points with naive UTC times. A time that does not parse
/// is dropped rather than failing the whole batch.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_str).and_then(parse_timestamp))
}

impl LivePoint {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Body of `GET /api/live-track`.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveTrackResponse {
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub points: Vec<LivePoint>,
}

/// What the UI has to do after applying a poll result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiveUpdate {
    Unchanged,
    Moved,
    /// First successful poll; the map should center on this point.
    FirstFix(LatLng),
}

/// Rendered live path and current position marker.
#[derive(Debug, Default)]
pub struct LiveTrack {
    path: Vec<LatLng>,
    marker: Option<LatLng>,
    last_fix: Option<Timestamp>,
}

impl LiveTrack {
    /// Replace the whole path with `points`. An empty batch changes nothing.
    pub fn apply(&mut self, points: &[LivePoint]) -> LiveUpdate {
        let Some(last) = points.last() else {
            return LiveUpdate::Unchanged;
        };

        self.path = points.iter().map(LivePoint::position).collect();
        self.last_fix = last.time;

        let first = self.marker.is_none();
        self.marker = Some(last.position());
        if first { LiveUpdate::FirstFix(last.position()) } else { LiveUpdate::Moved }
    }

    pub fn path(&self) -> &[LatLng] {
        &self.path
    }

    pub fn marker(&self) -> Option<LatLng> {
        self.marker
    }

    pub fn last_fix(&self) -> Option<Timestamp> {
        self.last_fix
    }
}

/// A periodic task that runs `poll` every `period`, the first time right away.
///
/// Each tick spawns its poll independently, so a slow poll does not delay the
/// next one and two polls may be in flight at once. Stops when dropped.
pub struct LivePoller {
    handle: Option<JoinHandle<()>>,
}

impl LivePoller {
    pub fn start<F, Fut>(runtime: &Handle, period: Duration, poll: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let spawner = runtime.clone();
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                spawner.spawn(poll());
            }
        });

        debug!("live poller started with a {:?} period", period);
        Self { handle: Some(handle) }
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("stopping live poller");
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for LivePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
