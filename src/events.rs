use std::sync::mpsc;

use crate::error::ViewerError;
use crate::geo::LatLng;
use crate::live::LivePoint;
use crate::media::MediaRecord;
use crate::track::Track;

/// Everything that reaches the UI thread from outside the frame loop:
/// background results and map interactions.
#[derive(Debug)]
pub enum ViewerEvent {
    TrackLoaded(Track),
    /// A point on a track was clicked.
    LocationSelected { track: String, at: LatLng },
    MediaListed(Vec<MediaRecord>),
    UploadFinished(Result<MediaRecord, ViewerError>),
    LivePoints(Vec<LivePoint>),
}

/// Cloneable sending half. Wakes the UI after every send so the frame loop
/// picks the event up without waiting for input.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ViewerEvent>,
    ctx: Option<egui::Context>,
}

impl EventSender {
    pub fn send(&self, event: ViewerEvent) {
        if self.tx.send(event).is_err() {
            // Receiver is gone, the app is shutting down
            return;
        }
        if let Some(ctx) = self.ctx.as_ref() {
            ctx.request_repaint();
        }
    }
}

pub fn channel(ctx: Option<egui::Context>) -> (EventSender, mpsc::Receiver<ViewerEvent>) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx, ctx }, rx)
}
