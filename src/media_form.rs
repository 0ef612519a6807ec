//! The "add a media" form and its Idle → FormOpen → Submitting lifecycle.

use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;

use tracing::debug;
use tracing::error;

use crate::api::UploadRequest;
use crate::error::ViewerError;
use crate::geo::LatLng;
use crate::media::MediaRecord;

const STATUS_SENDING: &str = "Envoi en cours…";
const STATUS_SAVED: &str = "Média enregistré ✔";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    FormOpen,
    Submitting,
}

/// Where the user clicked. Only meaningful while the form is open.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMediaContext {
    pub track_id: String,
    pub position: LatLng,
}

impl PendingMediaContext {
    pub fn description(&self) -> String {
        format!("Trace : {} — position : {:.4}, {:.4}", self.track_id, self.position.lat, self.position.lng)
    }
}

pub struct MediaForm {
    state: FormState,
    context: Option<PendingMediaContext>,
    context_text: String,
    status: String,
    pub title: String,
    pub description: String,
    pub file: Option<PathBuf>,
    confirmation_delay: Duration,
    close_at: Option<Instant>,
}

impl MediaForm {
    pub fn new(confirmation_delay: Duration) -> Self {
        Self {
            state: FormState::Idle,
            context: None,
            context_text: String::new(),
            status: String::new(),
            title: String::new(),
            description: String::new(),
            file: None,
            confirmation_delay,
            close_at: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state != FormState::Idle
    }

    pub fn context(&self) -> Option<&PendingMediaContext> {
        self.context.as_ref()
    }

    pub fn context_text(&self) -> &str {
        &self.context_text
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Bind the form to a clicked location and reset its fields.
    pub fn open(&mut self, track_id: &str, at: LatLng) {
        let context = PendingMediaContext { track_id: track_id.to_string(), position: at };
        self.context_text = context.description();
        self.context = Some(context);
        self.status.clear();
        self.title.clear();
        self.description.clear();
        self.file = None;
        self.close_at = None;
        self.state = FormState::FormOpen;
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    /// Validate the form and build the upload. On success the form moves to
    /// `Submitting`; the caller is responsible for sending the request.
    pub fn submit(&mut self) -> Result<UploadRequest, ViewerError> {
        if self.state != FormState::FormOpen {
            debug!("ignoring submit while form is {:?}", self.state);
            return Err(ViewerError::FormNotOpen);
        }

        let Some(file_path) = self.file.clone() else {
            self.status = ViewerError::MissingFile.upload_status().to_string();
            return Err(ViewerError::MissingFile);
        };

        let (track_id, position) = match self.context.as_ref() {
            Some(context) => (context.track_id.clone(), context.position),
            None => (String::new(), LatLng::default()),
        };

        self.status = STATUS_SENDING.to_string();
        self.state = FormState::Submitting;

        Ok(UploadRequest { file_path, title: self.title.clone(), description: self.description.clone(), track_id, lat: position.lat, lng: position.lng })
    }

    /// Apply the outcome of an upload. Returns the record to draw on success.
    ///
    /// The record is returned even if the form was closed in the meantime; an
    /// in-flight upload is never discarded. A success always confirms and
    /// schedules the close of a visible form, even one reopened for another
    /// location while the upload was running.
    pub fn finish_upload(&mut self, result: Result<MediaRecord, ViewerError>, now: Instant) -> Option<MediaRecord> {
        match result {
            Ok(record) => {
                if self.is_visible() {
                    self.status = STATUS_SAVED.to_string();
                    self.close_at = Some(now + self.confirmation_delay);
                }
                Some(record)
            }
            Err(e) => {
                error!("media upload failed: {e}");
                if self.state == FormState::Submitting {
                    self.status = e.upload_status().to_string();
                    self.state = FormState::FormOpen;
                }
                None
            }
        }
    }

    /// Close the form once the confirmation delay has passed. Returns the time
    /// still left so the UI can schedule a repaint.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        let close_at = self.close_at?;
        if now >= close_at {
            self.close();
            None
        } else {
            Some(close_at - now)
        }
    }

    fn close(&mut self) {
        self.state = FormState::Idle;
        self.context = None;
        self.close_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_form() -> MediaForm {
        let mut form = MediaForm::new(Duration::from_millis(800));
        form.open("Activity 2", LatLng::new(43.296482, 5.369780));
        form
    }

    fn record() -> MediaRecord {
        serde_json::from_str(r#"{"lat":1.2345,"lng":6.789,"title":"T","type":"image/png","url":"/uploads/x.png"}"#).unwrap()
    }

    #[test]
    fn open_sets_context_text() {
        let form = open_form();
        assert_eq!(form.state(), FormState::FormOpen);
        assert_eq!(form.context_text(), "Trace : Activity 2 — position : 43.2965, 5.3698");
        assert!(form.status().is_empty());
    }

    #[test]
    fn reopening_resets_fields() {
        let mut form = open_form();
        form.title = "old".into();
        form.file = Some(PathBuf::from("a.png"));
        let _ = form.submit();
        form.finish_upload(Err(ViewerError::MissingFile), Instant::now());

        form.open("Activity 3", LatLng::new(1.0, 2.0));
        assert!(form.title.is_empty());
        assert!(form.file.is_none());
        assert!(form.status().is_empty());
        assert_eq!(form.context().map(|c| c.track_id.as_str()), Some("Activity 3"));
    }

    #[test]
    fn submit_without_file_stays_open() {
        let mut form = open_form();
        assert!(matches!(form.submit(), Err(ViewerError::MissingFile)));
        assert_eq!(form.state(), FormState::FormOpen);
        assert_eq!(form.status(), "Merci de choisir un fichier.");
    }

    #[test]
    fn submit_builds_request_from_context() {
        let mut form = open_form();
        form.file = Some(PathBuf::from("/tmp/x.png"));
        form.title = "Arrivée".into();
        let request = form.submit().unwrap();
        assert_eq!(form.state(), FormState::Submitting);
        assert_eq!(form.status(), "Envoi en cours…");
        assert_eq!(request.track_id, "Activity 2");
        assert_eq!(request.title, "Arrivée");
        assert_eq!(request.description, "");
        assert_eq!((request.lat, request.lng), (43.296482, 5.369780));
    }

    #[test]
    fn success_closes_after_delay() {
        let mut form = open_form();
        form.file = Some(PathBuf::from("/tmp/x.png"));
        form.submit().unwrap();

        let now = Instant::now();
        let record = form.finish_upload(Ok(record()), now).unwrap();
        assert_eq!((record.lat, record.lng), (1.2345, 6.789));
        assert_eq!(form.status(), "Média enregistré ✔");
        assert!(form.is_visible());

        assert_eq!(form.tick(now + Duration::from_millis(300)), Some(Duration::from_millis(500)));
        assert!(form.is_visible());
        assert_eq!(form.tick(now + Duration::from_millis(800)), None);
        assert_eq!(form.state(), FormState::Idle);
    }

    #[test]
    fn server_error_returns_to_open_form() {
        let mut form = open_form();
        form.file = Some(PathBuf::from("/tmp/x.png"));
        form.submit().unwrap();

        let result = form.finish_upload(Err(ViewerError::Server { status: reqwest::StatusCode::INTERNAL_SERVER_ERROR }), Instant::now());
        assert!(result.is_none());
        assert_eq!(form.state(), FormState::FormOpen);
        assert_eq!(form.status(), "Erreur lors de l'envoi du média.");
    }

    #[test]
    fn cancelled_upload_still_yields_record() {
        let mut form = open_form();
        form.file = Some(PathBuf::from("/tmp/x.png"));
        form.submit().unwrap();
        form.cancel();
        assert_eq!(form.state(), FormState::Idle);

        let now = Instant::now();
        assert!(form.finish_upload(Ok(record()), now).is_some());
        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(form.tick(now), None);
    }

    #[test]
    fn unreadable_file_reports_network_error() {
        let mut form = open_form();
        form.file = Some(PathBuf::from("/tmp/x.png"));
        form.submit().unwrap();

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(form.finish_upload(Err(ViewerError::Io(io)), Instant::now()).is_none());
        assert_eq!(form.state(), FormState::FormOpen);
        assert_eq!(form.status(), "Erreur réseau.");
    }

    #[test]
    fn garbled_response_reports_network_error() {
        let mut form = open_form();
        form.file = Some(PathBuf::from("/tmp/x.png"));
        form.submit().unwrap();

        let garbled = serde_json::from_str::<MediaRecord>("<html>").unwrap_err();
        form.finish_upload(Err(ViewerError::MalformedData(garbled)), Instant::now());
        assert_eq!(form.state(), FormState::FormOpen);
        assert_eq!(form.status(), "Erreur réseau.");
    }

    #[test]
    fn success_after_reopen_still_confirms_and_closes() {
        let mut form = open_form();
        form.file = Some(PathBuf::from("/tmp/x.png"));
        form.submit().unwrap();
        form.open("Activity 4", LatLng::new(3.0, 4.0));

        let now = Instant::now();
        assert!(form.finish_upload(Ok(record()), now).is_some());
        assert_eq!(form.status(), "Média enregistré ✔");
        assert_eq!(form.tick(now + Duration::from_millis(800)), None);
        assert_eq!(form.state(), FormState::Idle);
    }

    #[test]
    fn submit_while_idle_does_nothing() {
        let mut form = MediaForm::new(Duration::from_millis(800));
        form.file = Some(PathBuf::from("/tmp/x.png"));
        assert!(matches!(form.submit(), Err(ViewerError::FormNotOpen)));
        assert_eq!(form.state(), FormState::Idle);
    }
}
