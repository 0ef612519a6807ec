//! Media records returned by the API and the markers built from them.

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::geo::LatLng;

/// Path under the API origin where bare upload file names are served.
pub const UPLOADS_PATH: &str = "/uploads/";

const PLACEHOLDER_TITLE: &str = "Média";

/// A media item as stored by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(default, rename = "trackId")]
    pub track_id: Option<String>,
}

impl MediaRecord {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Decode a media listing. Anything other than a JSON array yields `None`;
/// array entries that are not media records are skipped.
pub fn records_from_listing(value: serde_json::Value) -> Option<Vec<MediaRecord>> {
    let serde_json::Value::Array(items) = value else {
        return None;
    };

    let records = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<MediaRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("skipping malformed media entry: {e}");
                None
            }
        })
        .collect();

    Some(records)
}

/// Turn the URL stored on a record into one loadable from this client.
///
/// Absolute URLs are kept, rooted paths are joined to `api_base`, and bare file
/// names are assumed to live under the uploads directory.
pub fn resolve_asset_url(url: &str, api_base: &str) -> String {
    let api_base = api_base.trim_end_matches('/');
    if url.starts_with("http") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{api_base}{url}")
    } else {
        format!("{api_base}{UPLOADS_PATH}{url}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaAsset {
    /// Played inline (or in the system player).
    Video { url: String },
    /// Shown as a thumbnail that opens the lightbox.
    Image { url: String, title: String },
}

impl MediaAsset {
    pub fn url(&self) -> &str {
        match self {
            MediaAsset::Video { url } | MediaAsset::Image { url, .. } => url,
        }
    }
}

/// Render-ready marker for one media record.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaMarker {
    pub id: Option<u64>,
    pub position: LatLng,
    pub title: String,
    pub description: Option<String>,
    pub asset: Option<MediaAsset>,
}

impl MediaMarker {
    /// Both the gallery loader and the upload workflow go through here so they
    /// resolve URLs identically.
    pub fn from_record(record: &MediaRecord, api_base: &str) -> Self {
        let title = record.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(PLACEHOLDER_TITLE).to_string();
        let description = record.description.clone().filter(|d| !d.is_empty());

        let asset = record.url.as_deref().filter(|u| !u.is_empty()).map(|url| {
            let url = resolve_asset_url(url, api_base);
            let is_video = record.mime_type.as_deref().is_some_and(|t| t.starts_with("video/"));
            if is_video { MediaAsset::Video { url } } else { MediaAsset::Image { url, title: title.clone() } }
        });

        Self { id: record.id, position: record.position(), title, description, asset }
    }
}

/// The "Médias" overlay group.
#[derive(Debug, Default)]
pub struct MediaLayer {
    markers: Vec<MediaMarker>,
}

impl MediaLayer {
    pub fn add_record(&mut self, record: &MediaRecord, api_base: &str) {
        self.markers.push(MediaMarker::from_record(record, api_base));
    }

    pub fn markers(&self) -> &[MediaMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// MIME type sent with an upload, guessed from the file extension.
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let ext = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_the_three_url_shapes() {
        assert_eq!(resolve_asset_url("a.png", "https://X"), "https://X/uploads/a.png");
        assert_eq!(resolve_asset_url("/b.png", "https://X"), "https://X/b.png");
        assert_eq!(resolve_asset_url("https://other/c.png", "https://X"), "https://other/c.png");
        assert_eq!(resolve_asset_url("/b.png", "https://X/"), "https://X/b.png");
    }

    #[test]
    fn marker_uses_placeholder_title() {
        let record: MediaRecord = serde_json::from_str(r#"{"lat":1.0,"lng":2.0,"title":"","url":"x.jpg","type":"image/jpeg"}"#).unwrap();
        let marker = MediaMarker::from_record(&record, "https://api");
        assert_eq!(marker.title, "Média");
        assert_eq!(marker.description, None);
        assert_eq!(marker.asset, Some(MediaAsset::Image { url: "https://api/uploads/x.jpg".into(), title: "Média".into() }));
    }

    #[test]
    fn video_types_get_a_video_asset() {
        let record: MediaRecord =
            serde_json::from_str(r#"{"id":3,"lat":1.0,"lng":2.0,"title":"Clip","description":"Vagues","url":"/uploads/c.mp4","type":"video/mp4","trackId":"Activity 2"}"#).unwrap();
        assert_eq!(record.track_id.as_deref(), Some("Activity 2"));

        let marker = MediaMarker::from_record(&record, "https://api");
        assert_eq!(marker.id, Some(3));
        assert_eq!(marker.description.as_deref(), Some("Vagues"));
        assert_eq!(marker.asset, Some(MediaAsset::Video { url: "https://api/uploads/c.mp4".into() }));
    }

    #[test]
    fn missing_url_means_no_asset() {
        let record: MediaRecord = serde_json::from_str(r#"{"lat":1.0,"lng":2.0}"#).unwrap();
        assert_eq!(MediaMarker::from_record(&record, "https://api").asset, None);
    }

    #[test]
    fn listing_must_be_an_array() {
        assert!(records_from_listing(serde_json::json!({"items": []})).is_none());

        let records = records_from_listing(serde_json::json!([
            {"lat": 1.0, "lng": 2.0},
            {"title": "no position"},
            {"lat": 3.0, "lng": 4.0, "title": "ok"}
        ]))
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].position(), LatLng::new(3.0, 4.0));
    }

    #[test]
    fn mime_guess_by_extension() {
        assert_eq!(guess_mime_type("IMG_0001.JPG"), "image/jpeg");
        assert_eq!(guess_mime_type("clip.mov"), "video/quicktime");
        assert_eq!(guess_mime_type("README"), "application/octet-stream");
    }
}
