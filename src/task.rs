//! Background work. Every task runs on the tokio runtime and reports back to
//! the UI thread through the event channel; nothing here touches UI state.

use tokio::runtime::Handle;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::api::ApiClient;
use crate::api::UploadRequest;
use crate::error::ViewerError;
use crate::events::EventSender;
use crate::events::ViewerEvent;
use crate::live::LivePoller;
use crate::settings::TrackSource;
use crate::settings::ViewerConfig;
use crate::track::Track;

async fn load_track(api: &ApiClient, source: &TrackSource) -> Result<Track, ViewerError> {
    let text = if source.is_remote() { api.fetch_text(&source.path).await? } else { tokio::fs::read_to_string(&source.path).await? };
    Track::from_gpx(&source.name, &source.path, &text)
}

/// Load every track file concurrently. Failures are logged and the track is
/// skipped.
pub fn start_track_loading(runtime: &Handle, api: &ApiClient, sources: &[TrackSource], events: &EventSender) {
    for source in sources.iter().cloned() {
        let api = api.clone();
        let events = events.clone();
        runtime.spawn(async move {
            match load_track(&api, &source).await {
                Ok(track) => {
                    info!("loaded track {:?} from {}: {} points, {:.1} km", track.name(), track.source(), track.points().len(), track.distance_m() / 1000.0);
                    events.send(ViewerEvent::TrackLoaded(track));
                }
                Err(e) => error!("failed to load track {:?} from {:?}: {}", source.name, source.path, e),
            }
        });
    }
}

/// Fetch the media already stored on the server.
pub fn start_media_listing(runtime: &Handle, api: &ApiClient, events: &EventSender) {
    let api = api.clone();
    let events = events.clone();
    runtime.spawn(async move {
        match api.list_media().await {
            Ok(Some(records)) => {
                info!("loaded {} existing media", records.len());
                events.send(ViewerEvent::MediaListed(records));
            }
            Ok(None) => warn!("media listing was not an array"),
            Err(ViewerError::MalformedData(e)) => warn!("media listing could not be decoded: {}", e),
            Err(e) => error!("failed to load existing media: {}", e),
        }
    });
}

pub fn start_upload(runtime: &Handle, api: &ApiClient, request: UploadRequest, events: &EventSender) {
    let api = api.clone();
    let events = events.clone();
    runtime.spawn(async move {
        let result = api.upload_media(request).await;
        if let Ok(record) = &result {
            info!("media {:?} stored at {}, {}", record.id, record.lat, record.lng);
        }
        events.send(ViewerEvent::UploadFinished(result));
    });
}

/// Poll the live track until the returned poller is stopped or dropped.
/// Failed or empty polls are not reported to the UI.
pub fn start_live_polling(runtime: &Handle, api: &ApiClient, config: &ViewerConfig, events: &EventSender) -> LivePoller {
    let api = api.clone();
    let events = events.clone();
    let track_id = config.live_track_id.clone();

    LivePoller::start(runtime, config.poll_interval(), move || {
        let api = api.clone();
        let events = events.clone();
        let track_id = track_id.clone();
        async move {
            match api.live_track(&track_id).await {
                Ok(points) if points.is_empty() => debug!("live track {:?} has no points yet", track_id),
                Ok(points) => events.send(ViewerEvent::LivePoints(points)),
                Err(ViewerError::Server { status }) => warn!("live track request answered {}", status),
                Err(ViewerError::MalformedData(e)) => warn!("live track payload could not be decoded: {}", e),
                Err(e) => error!("live track update failed: {}", e),
            }
        }
    })
}
