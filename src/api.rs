//! Client for the remote tracking API.

use std::path::PathBuf;

use reqwest::multipart;
use tracing::debug;
use tracing::info;

use crate::error::ViewerError;
use crate::live::LivePoint;
use crate::live::LiveTrackResponse;
use crate::media::MediaRecord;
use crate::media::guess_mime_type;
use crate::media::records_from_listing;

/// Everything needed to build the multipart body of `POST /api/media`.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub file_path: PathBuf,
    pub title: String,
    pub description: String,
    pub track_id: String,
    pub lat: f64,
    pub lng: f64,
}

impl UploadRequest {
    pub fn file_name(&self) -> String {
        self.file_path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| "upload".to_string())
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client: reqwest::Client::new(), base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn media_url(&self) -> String {
        format!("{}/api/media", self.base)
    }

    pub fn live_track_url(&self) -> String {
        format!("{}/api/live-track", self.base)
    }

    /// `GET /api/media`. `Ok(None)` when the server answered with something
    /// other than a list.
    pub async fn list_media(&self) -> Result<Option<Vec<MediaRecord>>, ViewerError> {
        let response = self.client.get(self.media_url()).send().await?;
        if !response.status().is_success() {
            return Err(ViewerError::Server { status: response.status() });
        }

        let body = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        Ok(records_from_listing(value))
    }

    /// `POST /api/media` as a multipart form.
    pub async fn upload_media(&self, request: UploadRequest) -> Result<MediaRecord, ViewerError> {
        let bytes = tokio::fs::read(&request.file_path).await?;
        let file_name = request.file_name();
        info!("uploading {} ({} bytes) for track {:?}", file_name, bytes.len(), request.track_id);

        let file = multipart::Part::bytes(bytes).file_name(file_name.clone()).mime_str(guess_mime_type(&file_name))?;
        let form = multipart::Form::new()
            .part("file", file)
            .text("title", request.title)
            .text("description", request.description)
            .text("trackId", request.track_id)
            .text("lat", request.lat.to_string())
            .text("lng", request.lng.to_string());

        let response = self.client.post(self.media_url()).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(ViewerError::Server { status: response.status() });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// `GET /api/live-track?track_id=<id>`.
    pub async fn live_track(&self, track_id: &str) -> Result<Vec<LivePoint>, ViewerError> {
        let response = self.client.get(self.live_track_url()).query(&[("track_id", track_id)]).send().await?;
        if !response.status().is_success() {
            return Err(ViewerError::Server { status: response.status() });
        }

        let body = response.bytes().await?;
        let track: LiveTrackResponse = serde_json::from_slice(&body)?;
        debug!("live track {:?}: {} points", track.track_id, track.points.len());
        Ok(track.points)
    }

    /// Fetch a track file served over HTTP.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ViewerError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ViewerError::Server { status: response.status() });
        }
        Ok(response.text().await?)
    }
}
